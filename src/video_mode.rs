use std::fmt;

use anyhow::{anyhow, Context, Result};
use roxmltree::{Document, Node};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::number::Number;

/// Display resolution and color depth.
///
/// Field order gives the derived ordering: width first, then height, then
/// bits per pixel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VideoMode {
    pub width: u32,
    pub height: u32,
    pub bits_per_pixel: u32,
}

impl VideoMode {
    pub const TYPE_NAME: &'static str = "VideoMode";
    pub const DEFAULT_BITS_PER_PIXEL: u32 = 32;

    pub const fn new(width: u32, height: u32, bits_per_pixel: u32) -> Self {
        Self {
            width,
            height,
            bits_per_pixel,
        }
    }

    pub const fn with_default_depth(width: u32, height: u32) -> Self {
        Self::new(width, height, Self::DEFAULT_BITS_PER_PIXEL)
    }

    pub fn components(self) -> [u32; 3] {
        [self.width, self.height, self.bits_per_pixel]
    }

    pub fn from_components([width, height, bits_per_pixel]: [u32; 3]) -> Self {
        Self::new(width, height, bits_per_pixel)
    }

    /// Three-way comparison as the host sees it: -1, 0 or 1.
    pub fn compare(&self, other: &Self) -> i64 {
        match self.cmp(other) {
            std::cmp::Ordering::Less => -1,
            std::cmp::Ordering::Equal => 0,
            std::cmp::Ordering::Greater => 1,
        }
    }

    pub const fn memory_usage() -> usize {
        std::mem::size_of::<VideoMode>()
    }
}

impl fmt::Display for VideoMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({}x{}, {}-bits)",
            Self::TYPE_NAME,
            self.width,
            self.height,
            self.bits_per_pixel
        )
    }
}

impl Serialize for VideoMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.components().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for VideoMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let components = <[Number; 3]>::deserialize(deserializer)?;
        let [width, height, bits_per_pixel] = components.map(|component| {
            component
                .to_u32()
                .map_err(<D::Error as serde::de::Error>::custom)
        });
        Ok(VideoMode::new(width?, height?, bits_per_pixel?))
    }
}

/// Source of display information for scripts.
pub trait DisplayProvider: Send + Sync {
    /// Mode the desktop is currently running in.
    fn desktop_mode(&self) -> VideoMode;

    /// Modes usable for exclusive fullscreen, in platform order.
    fn fullscreen_modes(&self) -> Vec<VideoMode>;

    fn is_valid(&self, mode: &VideoMode) -> bool {
        self.fullscreen_modes().contains(mode)
    }
}

/// Display that always reports the same snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticDisplay {
    desktop: VideoMode,
    modes: Vec<VideoMode>,
}

impl StaticDisplay {
    pub fn new(desktop: VideoMode, modes: Vec<VideoMode>) -> Self {
        Self { desktop, modes }
    }

    /// Snapshot used when no display server is reachable.
    pub fn headless() -> Self {
        let mode = VideoMode::with_default_depth(1280, 720);
        Self::new(mode, vec![mode])
    }

    /// Parses a display profile.
    ///
    /// ```xml
    /// <display>
    ///   <desktop>1920 1080 32</desktop>
    ///   <mode>1920 1080 32</mode>
    ///   <mode>1280 720</mode>
    /// </display>
    /// ```
    ///
    /// A missing depth defaults to 32 bits. Without a `<desktop>` entry the
    /// first listed mode is used.
    pub fn from_xml(xml: &str) -> Result<Self> {
        let document = Document::parse(xml).context("invalid display profile XML")?;
        let root = document.root_element();
        if !root.has_tag_name("display") {
            return Err(anyhow!(
                "expected <display> root element, found <{}>",
                root.tag_name().name()
            ));
        }

        let modes = root
            .children()
            .filter(|node| node.has_tag_name("mode"))
            .map(|node| parse_mode(&node))
            .collect::<Result<Vec<_>>>()?;

        let desktop = match root.children().find(|node| node.has_tag_name("desktop")) {
            Some(node) => parse_mode(&node)?,
            None => *modes
                .first()
                .ok_or_else(|| anyhow!("display profile lists no modes"))?,
        };

        Ok(Self::new(desktop, modes))
    }
}

impl DisplayProvider for StaticDisplay {
    fn desktop_mode(&self) -> VideoMode {
        self.desktop
    }

    fn fullscreen_modes(&self) -> Vec<VideoMode> {
        self.modes.clone()
    }
}

fn parse_mode(node: &Node<'_, '_>) -> Result<VideoMode> {
    let text = node.text().map(str::trim).unwrap_or_default();
    let numbers = text
        .split_whitespace()
        .map(|component| {
            component
                .parse::<u32>()
                .with_context(|| format!("invalid number {component:?} in <{}>", node.tag_name().name()))
        })
        .collect::<Result<Vec<_>>>()?;
    match numbers.as_slice() {
        [width, height] => Ok(VideoMode::with_default_depth(*width, *height)),
        [width, height, bpp] => Ok(VideoMode::new(*width, *height, *bpp)),
        _ => Err(anyhow!(
            "<{}> expects `width height [bpp]`, found {text:?}",
            node.tag_name().name()
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROFILE: &str = r#"
    <display>
        <desktop>1920 1080 32</desktop>
        <mode>1920 1080 32</mode>
        <mode>800 600 16</mode>
        <mode>1280 720</mode>
    </display>
    "#;

    #[test]
    fn ordering_is_lexicographic() {
        let small = VideoMode::new(800, 600, 32);
        let large = VideoMode::new(1024, 768, 32);
        assert_eq!(small.compare(&large), -1);
        assert_eq!(large.compare(&small), 1);
        assert_eq!(small.compare(&VideoMode::new(800, 600, 32)), 0);
        assert!(VideoMode::new(800, 600, 16) < VideoMode::new(800, 600, 32));
        assert!(VideoMode::new(800, 900, 8) < VideoMode::new(1024, 10, 8));
    }

    #[test]
    fn display_format_matches_inspect() {
        assert_eq!(
            VideoMode::new(800, 600, 32).to_string(),
            "VideoMode(800x600, 32-bits)"
        );
    }

    #[test]
    fn native_struct_is_three_words() {
        assert_eq!(VideoMode::memory_usage(), 12);
    }

    #[test]
    fn profile_keeps_platform_order() {
        let display = StaticDisplay::from_xml(PROFILE).unwrap();
        assert_eq!(display.desktop_mode(), VideoMode::new(1920, 1080, 32));
        assert_eq!(
            display.fullscreen_modes(),
            vec![
                VideoMode::new(1920, 1080, 32),
                VideoMode::new(800, 600, 16),
                VideoMode::new(1280, 720, 32),
            ]
        );
    }

    #[test]
    fn validity_is_membership_in_fullscreen_list() {
        let display = StaticDisplay::from_xml(PROFILE).unwrap();
        assert!(display.is_valid(&VideoMode::new(800, 600, 16)));
        assert!(!display.is_valid(&VideoMode::new(800, 600, 32)));
    }

    #[test]
    fn desktop_falls_back_to_first_mode() {
        let display = StaticDisplay::from_xml("<display><mode>640 480 24</mode></display>").unwrap();
        assert_eq!(display.desktop_mode(), VideoMode::new(640, 480, 24));
    }

    #[test]
    fn malformed_profiles_are_errors() {
        assert!(StaticDisplay::from_xml("<screens/>").is_err());
        assert!(StaticDisplay::from_xml("<display/>").is_err());
        assert!(StaticDisplay::from_xml("<display><mode>640</mode></display>").is_err());
        assert!(StaticDisplay::from_xml("<display><mode>640 x</mode></display>").is_err());
    }
}
