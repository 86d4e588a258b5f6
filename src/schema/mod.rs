pub mod emotion;
pub mod entity;
pub mod part_of_speech;
