//! 画面コンポーネント

pub mod category_chip;
pub mod history;
pub mod layout;
pub mod upload;
