// [libs/domain/models/src/room.rs]
//! Enumeraciones cerradas de tipo de habitación y estilo de puesta en escena.
//! Cualquier valor fuera de estas variantes debe ser rechazado en la
//! frontera de validación (spec §4.3) antes de tocar la capa de persistencia.

use serde::{Deserialize, Serialize};
use typeshare::typeshare;

#[typeshare]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RoomType {
    LivingRoom,
    Bedroom,
    Kitchen,
    Bathroom,
    DiningRoom,
    Office,
    Entryway,
    Outdoor,
}

impl RoomType {
    pub const ALL: [RoomType; 8] = [
        RoomType::LivingRoom,
        RoomType::Bedroom,
        RoomType::Kitchen,
        RoomType::Bathroom,
        RoomType::DiningRoom,
        RoomType::Office,
        RoomType::Entryway,
        RoomType::Outdoor,
    ];

    /// Identificador estable usado como llave en la biblioteca de prompts
    /// y en las columnas de texto de la base de datos.
    pub fn as_key(&self) -> &'static str {
        match self {
            RoomType::LivingRoom => "living_room",
            RoomType::Bedroom => "bedroom",
            RoomType::Kitchen => "kitchen",
            RoomType::Bathroom => "bathroom",
            RoomType::DiningRoom => "dining_room",
            RoomType::Office => "office",
            RoomType::Entryway => "entryway",
            RoomType::Outdoor => "outdoor",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|room| room.as_key() == key)
    }
}

#[typeshare]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Style {
    Modern,
    Contemporary,
    Traditional,
    Industrial,
    Scandinavian,
}

impl Style {
    pub const ALL: [Style; 5] = [
        Style::Modern,
        Style::Contemporary,
        Style::Traditional,
        Style::Industrial,
        Style::Scandinavian,
    ];

    pub fn as_key(&self) -> &'static str {
        match self {
            Style::Modern => "modern",
            Style::Contemporary => "contemporary",
            Style::Traditional => "traditional",
            Style::Industrial => "industrial",
            Style::Scandinavian => "scandinavian",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|style| style.as_key() == key)
    }
}
