//! Stylesheet tables: fonts, fills, borders, number formats and cell formats

#[derive(Debug, Clone, PartialEq)]
pub struct Font {
    pub name: String,
    pub size: f64,
    pub bold: bool,
}

impl Default for Font {
    fn default() -> Self {
        Self {
            name: "Calibri".to_string(),
            size: 11.0,
            bold: false,
        }
    }
}

impl Font {
    pub fn bold() -> Self {
        Self {
            bold: true,
            ..Default::default()
        }
    }
}

/// Pattern fill; only the empty fill is used
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fill {
    pub pattern: Option<String>,
}

/// Cell border; only the empty border is used
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Border {
    pub left: bool,
    pub right: bool,
    pub top: bool,
    pub bottom: bool,
}

/// A custom number format code registered under an id
#[derive(Debug, Clone, PartialEq)]
pub struct NumberFormat {
    pub id: u32,
    pub code: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HorizontalAlignment {
    Left,
    Center,
    Right,
}

/// A cell format (style) referenced by cells through its index
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellFormat {
    /// Built-in (below 164) or custom number format id
    pub number_format_id: u32,
    pub font_id: u32,
    pub fill_id: u32,
    pub border_id: u32,
    pub apply_number_format: bool,
    pub alignment: Option<HorizontalAlignment>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stylesheet {
    pub fonts: Vec<Font>,
    pub fills: Vec<Fill>,
    pub borders: Vec<Border>,
    pub number_formats: Vec<NumberFormat>,
    pub cell_formats: Vec<CellFormat>,
}

impl Stylesheet {
    pub fn cell_format(&self, style: u32) -> Option<&CellFormat> {
        self.cell_formats.get(style as usize)
    }

    /// Format code of a custom number format id
    pub fn number_format_code(&self, id: u32) -> Option<&str> {
        self.number_formats
            .iter()
            .find(|f| f.id == id)
            .map(|f| f.code.as_str())
    }

    pub fn font(&self, id: u32) -> Option<&Font> {
        self.fonts.get(id as usize)
    }
}
