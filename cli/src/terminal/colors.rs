use colored::Color;

pub const PRIMARY: Color = Color::TrueColor { r: 129, g: 200, b: 190 };
pub const ACCENT: Color = Color::TrueColor { r: 229, g: 192, b: 123 };
pub const SEPARATOR: Color = Color::BrightBlack;
pub const TEXT_DEFAULT: Color = Color::White;
