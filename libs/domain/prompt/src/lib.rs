// [libs/domain/prompt/src/lib.rs]
/*!
 * =================================================================
 * APARATO: PROMPT COMPOSER (V1.0 - GOLD MASTER)
 * CLASIFICACIÓN: DOMAIN LOGIC (ESTRATO L2)
 * RESPONSABILIDAD: TRADUCCIÓN DETERMINISTA DE INTENCIÓN A INSTRUCCIÓN TEXTUAL
 *
 * VISION HOLÍSTICA:
 * Función pura sin dependencias de I/O: dado (room_type, style,
 * custom_prompt) produce la instrucción final entregada al Adaptador
 * de Modelo. El preámbulo de preservación estructural se antepone
 * siempre, incluso a los prompts personalizados, de modo que el
 * modelo reciba las restricciones antes que los deseos.
 * =================================================================
 */

use realstage_core_models::{RoomType, Style};

/// Restricciones que se anteponen a toda instrucción compuesta, sin
/// excepción, para que el modelo reciba los límites antes que las
/// directivas de amueblado.
pub const STRUCTURAL_PRESERVATION_PREAMBLE: &str = "Do not modify walls, paint, windows, doors, or architectural features; add only furniture and decor; do not block doorways.";

/// Calcula la instrucción natural final para el proveedor generativo.
///
/// # Logic:
/// 1. Un `custom_prompt` no vacío se usa textual como núcleo.
/// 2. En ausencia de uno, se consulta la biblioteca curada por
///    `(room_type, style)`; en caso de fallo se degrada a
///    `(room_type, default)`, luego a `(default, style)`, y finalmente
///    a una plantilla genérica.
/// 3. El preámbulo de preservación estructural se antepone siempre.
pub fn compose(room_type: Option<RoomType>, style: Option<Style>, custom_prompt: Option<&str>) -> String {
    let core = match custom_prompt.map(str::trim).filter(|s| !s.is_empty()) {
        Some(custom) => custom.to_string(),
        None => curated_core_instruction(room_type, style),
    };
    format!("{} {}", STRUCTURAL_PRESERVATION_PREAMBLE, core)
}

fn curated_core_instruction(room_type: Option<RoomType>, style: Option<Style>) -> String {
    if let Some(room) = room_type {
        if let Some(style) = style {
            if let Some(hit) = lookup(room.as_key(), style.as_key()) {
                return hit.to_string();
            }
        }
        if let Some(hit) = lookup(room.as_key(), "default") {
            return hit.to_string();
        }
    }
    if let Some(style) = style {
        if let Some(hit) = lookup("default", style.as_key()) {
            return hit.to_string();
        }
    }
    GENERIC_TEMPLATE.to_string()
}

const GENERIC_TEMPLATE: &str =
    "Virtually stage this empty room with tastefully arranged furniture and decor appropriate to its apparent function.";

/// Biblioteca curada de instrucciones núcleo por combinación
/// (room_type, style). Las entradas `"default"` en cualquiera de las
/// dos posiciones sirven como los niveles de degradación intermedios
/// de `curated_core_instruction`.
fn lookup(room_key: &str, style_key: &str) -> Option<&'static str> {
    CURATED_LIBRARY
        .iter()
        .find(|(r, s, _)| *r == room_key && *s == style_key)
        .map(|(_, _, text)| *text)
}

type CuratedEntry = (&'static str, &'static str, &'static str);

const CURATED_LIBRARY: &[CuratedEntry] = &[
    ("living_room", "modern", "Stage a modern living room with a low-profile sectional sofa, a sleek glass or metal coffee table, minimalist shelving, and a neutral palette with one bold accent color."),
    ("living_room", "scandinavian", "Stage a Scandinavian living room with light wood furniture, a cozy knit throw, simple lines, and soft natural light tones."),
    ("living_room", "default", "Stage a living room with a comfortable sofa, coffee table, area rug, and tasteful wall decor suited to everyday family use."),
    ("bedroom", "contemporary", "Stage a contemporary bedroom with a platform bed, matching nightstands, a statement headboard, and layered neutral bedding."),
    ("bedroom", "traditional", "Stage a traditional bedroom with a wooden four-poster or sleigh bed, classic nightstands, and warm, richly textured bedding."),
    ("bedroom", "default", "Stage a bedroom with a neatly made bed, two nightstands with lamps, and a small accent chair or bench."),
    ("kitchen", "industrial", "Stage a kitchen vignette with a small bistro table, exposed-metal bar stools, and minimal countertop styling that reads as industrial-chic."),
    ("kitchen", "default", "Stage a kitchen with simple countertop styling, a fruit bowl or vase, and two bar stools at the island if present."),
    ("bathroom", "default", "Stage a bathroom with neatly folded towels, a bath mat, and a small plant or tray of toiletries, without altering fixtures."),
    ("dining_room", "modern", "Stage a modern dining room with a rectangular table, upholstered chairs, a statement pendant light fixture, and a simple centerpiece."),
    ("dining_room", "default", "Stage a dining room with a table set for six, matching chairs, and a simple centerpiece."),
    ("office", "default", "Stage a home office with a desk, ergonomic chair, bookshelf, and a small plant, keeping the layout functional and uncluttered."),
    ("entryway", "default", "Stage an entryway with a console table, a mirror, a small bench, and a tray for keys, keeping the walking path clear."),
    ("outdoor", "default", "Stage an outdoor space with weather-appropriate seating, a side table, and potted plants, without altering the hardscape."),
    ("default", "modern", "Virtually stage this room in a modern style with clean lines, a neutral palette, and one bold accent color."),
    ("default", "scandinavian", "Virtually stage this room in a Scandinavian style with light wood tones, soft textiles, and understated furniture."),
    ("default", "traditional", "Virtually stage this room in a traditional style with classic wood furniture and warm, richly textured fabrics."),
    ("default", "industrial", "Virtually stage this room in an industrial style with exposed materials, metal accents, and minimal ornamentation."),
    ("default", "contemporary", "Virtually stage this room in a contemporary style with current trends, simple silhouettes, and a balanced neutral-with-accent palette."),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_prompt_is_used_verbatim_with_preamble_prepended() {
        let result = compose(Some(RoomType::LivingRoom), Some(Style::Modern), Some("Add a red velvet armchair."));
        assert_eq!(result, format!("{} Add a red velvet armchair.", STRUCTURAL_PRESERVATION_PREAMBLE));
    }

    #[test]
    fn blank_custom_prompt_falls_through_to_curated_library() {
        let result = compose(Some(RoomType::Bedroom), Some(Style::Contemporary), Some("   "));
        assert!(result.contains("platform bed"));
    }

    #[test]
    fn exact_room_and_style_hit_is_preferred() {
        let result = compose(Some(RoomType::LivingRoom), Some(Style::Modern), None);
        assert!(result.contains("sectional sofa"));
    }

    #[test]
    fn missing_style_combination_falls_back_to_room_default() {
        let result = compose(Some(RoomType::Kitchen), Some(Style::Traditional), None);
        assert_eq!(result, format!("{} Stage a kitchen with simple countertop styling, a fruit bowl or vase, and two bar stools at the island if present.", STRUCTURAL_PRESERVATION_PREAMBLE));
    }

    #[test]
    fn missing_room_falls_back_to_style_default_when_room_absent() {
        let result = compose(None, Some(Style::Industrial), None);
        assert!(result.contains("industrial style"));
    }

    #[test]
    fn no_hints_at_all_falls_back_to_generic_template() {
        let result = compose(None, None, None);
        assert_eq!(result, format!("{} {}", STRUCTURAL_PRESERVATION_PREAMBLE, GENERIC_TEMPLATE));
    }

    #[test]
    fn preamble_is_always_the_prefix() {
        let result = compose(Some(RoomType::Office), None, Some("Minimalist standing desk setup."));
        assert!(result.starts_with(STRUCTURAL_PRESERVATION_PREAMBLE));
    }
}
