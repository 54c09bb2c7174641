//! Zaitun: a dark olive palette

use ratatui::style::Color;

use super::Theme;

pub const ZAITUN: Theme = Theme {
    name: "Zaitun",

    bg_primary: Color::Rgb(22, 27, 24),   // #161b18
    bg_secondary: Color::Rgb(31, 38, 33), // #1f2621

    fg_primary: Color::Rgb(214, 221, 205),   // #d6ddcd
    fg_secondary: Color::Rgb(176, 187, 166), // #b0bba6
    fg_muted: Color::Rgb(108, 121, 104),     // #6c7968

    accent_primary: Color::Rgb(201, 170, 92),  // #c9aa5c
    accent_secondary: Color::Rgb(132, 178, 143), // #84b28f

    ayah: Color::Rgb(240, 226, 186), // #f0e2ba

    success: Color::Rgb(134, 196, 110), // #86c46e
    warning: Color::Rgb(230, 181, 90),  // #e6b55a
    error: Color::Rgb(226, 110, 100),   // #e26e64

    border: Color::Rgb(61, 74, 64),            // #3d4a40
    border_focused: Color::Rgb(201, 170, 92), // #c9aa5c
};
