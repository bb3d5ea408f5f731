//! Sticker template descriptors.

use std::fmt::Write as _;

use festquest_core::rng::DeterministicRng;
use image::Rgb;

/// Visual identity of one sticker template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateDescriptor {
    /// Stable template name (`template1` .. `template5`).
    pub name: &'static str,
    /// Wash and border colour.
    pub primary_color: Rgb<u8>,
    /// Colour of the tagline and brand line.
    pub text_color: Rgb<u8>,
}

#[allow(clippy::cast_possible_truncation)]
const fn rgb(hex: u32) -> Rgb<u8> {
    Rgb([(hex >> 16) as u8, (hex >> 8) as u8, hex as u8])
}

const WHITE: Rgb<u8> = rgb(0xFF_FFFF);

/// The festival's sticker templates.
pub const TEMPLATES: [TemplateDescriptor; 5] = [
    TemplateDescriptor {
        name: "template1",
        primary_color: rgb(0xFF_6B6B),
        text_color: WHITE,
    },
    TemplateDescriptor {
        name: "template2",
        primary_color: rgb(0x4E_CDC4),
        text_color: WHITE,
    },
    TemplateDescriptor {
        name: "template3",
        primary_color: rgb(0x45_B7D1),
        text_color: WHITE,
    },
    TemplateDescriptor {
        name: "template4",
        primary_color: rgb(0x96_CEB4),
        text_color: WHITE,
    },
    TemplateDescriptor {
        name: "template5",
        primary_color: rgb(0xFF_EAA7),
        text_color: rgb(0x2D_3436),
    },
];

impl TemplateDescriptor {
    /// Primary colour as `#RRGGBB`.
    #[must_use]
    pub fn primary_hex(&self) -> String {
        to_hex(self.primary_color)
    }

    /// Text colour as `#RRGGBB`.
    #[must_use]
    pub fn text_hex(&self) -> String {
        to_hex(self.text_color)
    }
}

fn to_hex(color: Rgb<u8>) -> String {
    let mut out = String::with_capacity(7);
    out.push('#');
    for channel in color.0 {
        let _ = write!(out, "{channel:02X}");
    }
    out
}

/// Looks a template up by name.
#[must_use]
pub fn find_template(name: &str) -> Option<&'static TemplateDescriptor> {
    TEMPLATES.iter().find(|t| t.name == name)
}

/// Picks one template uniformly at random.
pub fn select_template(rng: &mut dyn DeterministicRng) -> &'static TemplateDescriptor {
    let index = rng.pick_index(TEMPLATES.len()).unwrap_or(0);
    &TEMPLATES[index.min(TEMPLATES.len() - 1)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use festquest_core::rng::StdRngSource;
    use festquest_test_support::{MockRng, SequenceRng};

    #[test]
    fn test_templates_carry_festival_palette() {
        let primaries: Vec<String> = TEMPLATES.iter().map(TemplateDescriptor::primary_hex).collect();
        assert_eq!(
            primaries,
            vec!["#FF6B6B", "#4ECDC4", "#45B7D1", "#96CEB4", "#FFEAA7"]
        );
        assert_eq!(TEMPLATES[0].text_hex(), "#FFFFFF");
        assert_eq!(TEMPLATES[4].text_hex(), "#2D3436");
    }

    #[test]
    fn test_find_template_by_name() {
        assert_eq!(find_template("template3").unwrap().primary_hex(), "#45B7D1");
        assert!(find_template("template9").is_none());
    }

    #[test]
    fn test_select_template_follows_rng() {
        let mut rng = SequenceRng::new(vec![4, 0, 2]);

        let names: Vec<&str> = (0..3).map(|_| select_template(&mut rng).name).collect();

        assert_eq!(names, vec!["template5", "template1", "template3"]);
    }

    #[test]
    fn test_select_template_with_mock_rng_picks_first() {
        assert_eq!(select_template(&mut MockRng).name, "template1");
    }

    #[test]
    fn test_select_template_reaches_every_template() {
        let mut rng = StdRngSource::seeded(99);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..500 {
            seen.insert(select_template(&mut rng).name);
        }
        assert_eq!(seen.len(), TEMPLATES.len());
    }
}
