// [apps/api/src/handlers/mod.rs]
//! Agrupa los handlers por recurso; cada submódulo expone un struct
//! vacío con un método `handle_*` por endpoint, siguiendo el mismo
//! idioma de despacho que el resto de la flota.

pub mod admin;
pub mod billing;
pub mod images;
pub mod internal;
pub mod projects;
pub mod stream;
pub mod uploads;
