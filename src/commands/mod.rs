pub mod battle;
pub mod guild;
