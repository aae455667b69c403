use std::str::FromStr;

/// An axis-aligned rectangle in points, origin at the top-left.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn zero() -> Self {
        Self {
            width: 0.0,
            height: 0.0,
        }
    }
}

/// The `writing-mode` trait of a reference area.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum WritingMode {
    #[default]
    LrTb,
    RlTb,
    TbRl,
    TbLr,
}

impl WritingMode {
    /// True when lines progress horizontally (inline-progression along x).
    pub fn is_horizontal(self) -> bool {
        matches!(self, WritingMode::LrTb | WritingMode::RlTb)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WritingMode::LrTb => "lr-tb",
            WritingMode::RlTb => "rl-tb",
            WritingMode::TbRl => "tb-rl",
            WritingMode::TbLr => "tb-lr",
        }
    }
}

impl FromStr for WritingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "lr-tb" | "lr" => Ok(WritingMode::LrTb),
            "rl-tb" | "rl" => Ok(WritingMode::RlTb),
            "tb-rl" | "tb" => Ok(WritingMode::TbRl),
            "tb-lr" => Ok(WritingMode::TbLr),
            other => Err(format!("Unknown writing-mode: {}", other)),
        }
    }
}
