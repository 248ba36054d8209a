// [libs/domain/adapters/src/adapters/mod.rs]
mod flux_kontext_max;
mod flux_kontext_pro;
mod qwen_image_edit;
mod seedream_3;
mod seedream_4;

pub use flux_kontext_max::BlackForestLabsFluxKontextMaxAdapter;
pub use flux_kontext_pro::BlackForestLabsFluxKontextProAdapter;
pub use qwen_image_edit::QwenImageEditAdapter;
pub use seedream_3::BytedanceSeedream3Adapter;
pub use seedream_4::BytedanceSeedream4Adapter;
