//! The closed universe of known properties.
//!
//! Each property has a stable global index (its discriminant), a category that
//! decides which families carry it, an inheritance flag, a value grammar and an
//! initial value.

use crate::category::PropertyCategory;
use crate::value::PropertyValue;
use quire_types::Color;

/// The grammar a property's specified value must match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Length,
    LengthOrAuto,
    Number,
    Color,
    Keyword(&'static [&'static str]),
    Text,
}

const FONT_WEIGHTS: &[&str] = &[
    "normal", "bold", "bolder", "lighter", "100", "200", "300", "400", "500", "600", "700",
    "800", "900",
];
const FONT_STYLES: &[&str] = &["normal", "italic", "oblique"];
const BORDER_STYLES: &[&str] = &["none", "solid", "dashed", "dotted", "double"];
const TEXT_ALIGNS: &[&str] = &["start", "end", "center", "justify", "left", "right"];
const POSITIONS: &[&str] = &["auto", "absolute", "fixed", "relative"];
const BREAKS: &[&str] = &["auto", "page", "column", "even-page", "odd-page"];
const KEEPS: &[&str] = &["auto", "always"];
const BOOLEANS: &[&str] = &["false", "true"];
const WRITING_MODES: &[&str] = &["lr-tb", "rl-tb", "tb-rl", "tb-lr"];
const SCALINGS: &[&str] = &["uniform", "non-uniform"];

macro_rules! define_properties {
    ($( $variant:ident => $name:literal, $cat:ident, $inherited:literal, $kind:expr, $init:expr; )*) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(u16)]
        pub enum PropertyId {
            $($variant),*
        }

        impl PropertyId {
            /// Every property, in global index order.
            pub const ALL: &'static [PropertyId] = &[$(PropertyId::$variant),*];

            pub fn name(self) -> &'static str {
                match self { $(PropertyId::$variant => $name),* }
            }

            pub fn category(self) -> PropertyCategory {
                match self { $(PropertyId::$variant => PropertyCategory::$cat),* }
            }

            pub fn is_inherited(self) -> bool {
                match self { $(PropertyId::$variant => $inherited),* }
            }

            pub fn value_kind(self) -> ValueKind {
                match self { $(PropertyId::$variant => $kind),* }
            }

            pub fn initial_value(self) -> PropertyValue {
                match self { $(PropertyId::$variant => $init),* }
            }

            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($name => Some(PropertyId::$variant),)*
                    _ => None,
                }
            }
        }
    };
}

define_properties! {
    SourceDocument => "source-document", Accessibility, false, ValueKind::Text, PropertyValue::text("");
    Role => "role", Accessibility, false, ValueKind::Text, PropertyValue::text("");

    FontFamily => "font-family", Font, true, ValueKind::Text, PropertyValue::text("Helvetica");
    FontSize => "font-size", Font, true, ValueKind::Length, PropertyValue::Length(12.0);
    FontWeight => "font-weight", Font, true, ValueKind::Keyword(FONT_WEIGHTS), PropertyValue::Keyword("normal");
    FontStyle => "font-style", Font, true, ValueKind::Keyword(FONT_STYLES), PropertyValue::Keyword("normal");

    Color => "color", Color, true, ValueKind::Color, PropertyValue::Color(Color::BLACK);
    BackgroundColor => "background-color", Background, false, ValueKind::Color, PropertyValue::Color(Color::WHITE);

    BorderWidth => "border-width", Border, false, ValueKind::Length, PropertyValue::Length(0.0);
    BorderStyle => "border-style", Border, false, ValueKind::Keyword(BORDER_STYLES), PropertyValue::Keyword("none");
    BorderColor => "border-color", Border, false, ValueKind::Color, PropertyValue::Color(Color::BLACK);

    PaddingTop => "padding-top", Padding, false, ValueKind::Length, PropertyValue::Length(0.0);
    PaddingBottom => "padding-bottom", Padding, false, ValueKind::Length, PropertyValue::Length(0.0);
    PaddingStart => "padding-start", Padding, false, ValueKind::Length, PropertyValue::Length(0.0);
    PaddingEnd => "padding-end", Padding, false, ValueKind::Length, PropertyValue::Length(0.0);

    MarginTop => "margin-top", Margin, false, ValueKind::Length, PropertyValue::Length(0.0);
    MarginBottom => "margin-bottom", Margin, false, ValueKind::Length, PropertyValue::Length(0.0);
    MarginLeft => "margin-left", Margin, false, ValueKind::Length, PropertyValue::Length(0.0);
    MarginRight => "margin-right", Margin, false, ValueKind::Length, PropertyValue::Length(0.0);
    SpaceBefore => "space-before", Margin, false, ValueKind::Length, PropertyValue::Length(0.0);
    SpaceAfter => "space-after", Margin, false, ValueKind::Length, PropertyValue::Length(0.0);

    TextAlign => "text-align", TextBlock, true, ValueKind::Keyword(TEXT_ALIGNS), PropertyValue::Keyword("start");
    TextIndent => "text-indent", TextBlock, true, ValueKind::Length, PropertyValue::Length(0.0);
    LineHeight => "line-height", TextBlock, true, ValueKind::Number, PropertyValue::Number(1.2);

    Width => "width", AreaDimension, false, ValueKind::LengthOrAuto, PropertyValue::Auto;
    Height => "height", AreaDimension, false, ValueKind::LengthOrAuto, PropertyValue::Auto;

    AbsolutePosition => "absolute-position", AbsolutePosition, false, ValueKind::Keyword(POSITIONS), PropertyValue::Keyword("auto");
    Top => "top", AbsolutePosition, false, ValueKind::LengthOrAuto, PropertyValue::Auto;
    Left => "left", AbsolutePosition, false, ValueKind::LengthOrAuto, PropertyValue::Auto;

    BreakBefore => "break-before", KeepsAndBreaks, false, ValueKind::Keyword(BREAKS), PropertyValue::Keyword("auto");
    BreakAfter => "break-after", KeepsAndBreaks, false, ValueKind::Keyword(BREAKS), PropertyValue::Keyword("auto");
    KeepTogether => "keep-together", KeepsAndBreaks, false, ValueKind::Keyword(KEEPS), PropertyValue::Keyword("auto");

    PageWidth => "page-width", PageGeometry, false, ValueKind::Length, PropertyValue::Length(595.0);
    PageHeight => "page-height", PageGeometry, false, ValueKind::Length, PropertyValue::Length(842.0);
    MasterName => "master-name", PageGeometry, false, ValueKind::Text, PropertyValue::text("");
    MasterReference => "master-reference", PageGeometry, false, ValueKind::Text, PropertyValue::text("");

    Extent => "extent", RegionGeometry, false, ValueKind::Length, PropertyValue::Length(0.0);
    RegionName => "region-name", RegionGeometry, false, ValueKind::Text, PropertyValue::text("");
    Precedence => "precedence", RegionGeometry, false, ValueKind::Keyword(BOOLEANS), PropertyValue::Keyword("false");

    WritingMode => "writing-mode", WritingMode, true, ValueKind::Keyword(WRITING_MODES), PropertyValue::Keyword("lr-tb");

    ContentWidth => "content-width", Graphic, false, ValueKind::LengthOrAuto, PropertyValue::Auto;
    ContentHeight => "content-height", Graphic, false, ValueKind::LengthOrAuto, PropertyValue::Auto;
    Scaling => "scaling", Graphic, false, ValueKind::Keyword(SCALINGS), PropertyValue::Keyword("uniform");
}

/// Number of known properties; the size of every slot mapping array.
pub const PROPERTY_COUNT: usize = PropertyId::ALL.len();

impl PropertyId {
    /// The global property index.
    pub fn index(self) -> usize {
        self as usize
    }
}
