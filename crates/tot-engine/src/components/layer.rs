/// Draw layer — controls draw order for entities.
///
/// Layers are drawn back-to-front: Background first, Overlay last.
/// A held item is lifted to `Drag` so it renders above its siblings,
/// and the tutorial hand/spotlight always sits on top in `Overlay`.
/// Default layer is `Playfield`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(u8)]
pub enum Layer {
    Background = 0,
    Scenery = 1,
    #[default]
    Playfield = 2,
    Drag = 3,
    Particles = 4,
    Overlay = 5,
}

impl Layer {
    /// Total number of draw layers.
    pub const COUNT: usize = 6;

    /// Convert from a u8 value to a Layer.
    /// Returns None if the value is out of range.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Background),
            1 => Some(Self::Scenery),
            2 => Some(Self::Playfield),
            3 => Some(Self::Drag),
            4 => Some(Self::Particles),
            5 => Some(Self::Overlay),
            _ => None,
        }
    }

    /// Convert to u8 for the visual buffer.
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}
