pub mod narrate;

pub use narrate::NarrateController;
