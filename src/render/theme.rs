// Statement colors

use super::Rgb;

/// Titles, header bars and grand-total rows
pub const BRAND: Rgb = Rgb::new(0x1d, 0x11, 0x3e);
/// Month line on the cover
pub const ACCENT: Rgb = Rgb::new(0x40, 0xc0, 0x6f);
pub const TEXT: Rgb = Rgb::BLACK;
pub const TEXT_ON_BRAND: Rgb = Rgb::WHITE;

pub const DATA_ROW: Rgb = Rgb::new(0xef, 0xef, 0xef);
pub const STRIPED_ROW: Rgb = Rgb::new(0xf5, 0xf5, 0xf5);
pub const GROUP_HEADER_ROW: Rgb = Rgb::new(0xd0, 0xd0, 0xd0);

/// Pie drawn when there is nothing to split
pub const NEUTRAL: Rgb = Rgb::new(0xef, 0xef, 0xef);

pub const CURRENCY_PALETTE: [Rgb; 2] = [Rgb::new(0x29, 0x22, 0x43), Rgb::new(0x7f, 0xc6, 0xb3)];

pub const FUND_PALETTE: [Rgb; 9] = [
    Rgb::new(0x29, 0x22, 0x43),
    Rgb::new(0x7f, 0xc6, 0xb3),
    Rgb::new(0x62, 0x5e, 0xa7),
    Rgb::new(0xc4, 0xb2, 0xd5),
    Rgb::new(0x65, 0x8d, 0xc2),
    Rgb::new(0xda, 0xa7, 0x6f),
    Rgb::new(0xdd, 0xda, 0x9e),
    Rgb::new(0xc1, 0xdf, 0xc5),
    Rgb::new(0xa1, 0xd7, 0xec),
];
