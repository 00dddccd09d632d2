//! CLI enum types for the output painter option.

use clap::ValueEnum;

use crate::canvas::Painter;

/// Cell painter used to draw images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Output {
    #[default]
    Halfblock,
    Ascii,
    Braille,
}

impl From<Output> for Painter {
    fn from(o: Output) -> Self {
        match o {
            Output::Halfblock => Painter::Halfblock,
            Output::Ascii => Painter::Ascii,
            Output::Braille => Painter::Braille,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_to_painter() {
        assert_eq!(Painter::from(Output::Halfblock), Painter::Halfblock);
        assert_eq!(Painter::from(Output::Ascii), Painter::Ascii);
        assert_eq!(Painter::from(Output::Braille), Painter::Braille);
    }

    #[test]
    fn test_output_default_matches_painter_default() {
        assert_eq!(Painter::from(Output::default()), Painter::default());
    }
}
