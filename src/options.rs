//! Conversion options and configuration.

use crate::error::{Error, Result};
use std::ops::RangeInclusive;

/// Options shared by import, export and the rasterizer.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Import type layers as bitmaps instead of editable text
    pub rasterize_text: bool,

    /// How layer opacity is carried into elements on import
    pub opacity_policy: OpacityPolicy,

    /// Upscale and sharpen raster layers on import
    pub enhance_images: bool,

    /// Upscale factor used by enhancement
    pub enhance_quality: EnhanceQuality,

    /// Whether to use parallel processing
    pub parallel: bool,

    /// RGBA fill of placeholder bitmaps
    pub placeholder_color: [u8; 4],

    /// File name of the multi-page archive
    pub archive_name: String,
}

impl ConvertOptions {
    /// Create new options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable text rasterization.
    pub fn with_rasterize_text(mut self, rasterize: bool) -> Self {
        self.rasterize_text = rasterize;
        self
    }

    /// Import type layers as editable text.
    pub fn editable_text(mut self) -> Self {
        self.rasterize_text = false;
        self
    }

    /// Set opacity policy.
    pub fn with_opacity_policy(mut self, policy: OpacityPolicy) -> Self {
        self.opacity_policy = policy;
        self
    }

    /// Enable or disable image enhancement.
    pub fn with_enhance_images(mut self, enhance: bool) -> Self {
        self.enhance_images = enhance;
        self
    }

    /// Set enhancement quality.
    pub fn with_enhance_quality(mut self, quality: EnhanceQuality) -> Self {
        self.enhance_quality = quality;
        self
    }

    /// Enhance with the 3x upscale.
    pub fn high_quality(mut self) -> Self {
        self.enhance_quality = EnhanceQuality::High;
        self
    }

    /// Enable or disable parallel processing.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Set placeholder color.
    pub fn with_placeholder_color(mut self, rgba: [u8; 4]) -> Self {
        self.placeholder_color = rgba;
        self
    }

    /// Set archive file name.
    pub fn with_archive_name(mut self, name: impl Into<String>) -> Self {
        self.archive_name = name.into();
        self
    }
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            rasterize_text: true,
            opacity_policy: OpacityPolicy::ForceOpaque,
            enhance_images: true,
            enhance_quality: EnhanceQuality::Standard,
            parallel: true,
            placeholder_color: [204, 204, 204, 255],
            archive_name: "pages.zip".to_string(),
        }
    }
}

/// How layer opacity becomes element opacity on import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OpacityPolicy {
    /// Every imported element is fully opaque
    #[default]
    ForceOpaque,
    /// Layer opacity / 255
    Preserve,
}

impl OpacityPolicy {
    /// Element opacity for a layer opacity byte.
    pub fn apply(self, layer_opacity: u8) -> f64 {
        match self {
            OpacityPolicy::ForceOpaque => 1.0,
            OpacityPolicy::Preserve => layer_opacity as f64 / 255.0,
        }
    }
}

/// Upscale factor for image enhancement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnhanceQuality {
    /// 2x
    #[default]
    Standard,
    /// 3x
    High,
}

impl EnhanceQuality {
    /// Upscale factor.
    pub fn factor(self) -> u32 {
        match self {
            EnhanceQuality::Standard => 2,
            EnhanceQuality::High => 3,
        }
    }
}

/// Largest page number [`PageSelection::parse`] accepts.
pub const MAX_PAGE_NUMBER: usize = 10_000;

/// Page selection for batch export (1-indexed).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PageSelection {
    /// Export all pages
    #[default]
    All,
    /// Export one page
    Single(usize),
    /// Export a range of pages (inclusive)
    Range(RangeInclusive<usize>),
    /// Export specific pages
    List(Vec<usize>),
}

impl PageSelection {
    /// Check if a page number should be included.
    pub fn includes(&self, page: usize) -> bool {
        match self {
            PageSelection::All => true,
            PageSelection::Single(p) => *p == page,
            PageSelection::Range(range) => range.contains(&page),
            PageSelection::List(pages) => pages.contains(&page),
        }
    }

    /// Page numbers selected out of `page_count` pages, in ascending order.
    ///
    /// Numbers outside `1..=page_count` are an error rather than being
    /// silently dropped.
    pub fn resolve(&self, page_count: usize) -> Result<Vec<usize>> {
        let check = |p: usize| {
            if p == 0 || p > page_count {
                Err(Error::InvalidPageRange(format!(
                    "page {} out of range 1-{}",
                    p, page_count
                )))
            } else {
                Ok(())
            }
        };

        match self {
            PageSelection::All => {}
            PageSelection::Single(p) => check(*p)?,
            PageSelection::Range(range) => {
                if range.start() > range.end() {
                    return Err(Error::InvalidPageRange(format!(
                        "{}-{}",
                        range.start(),
                        range.end()
                    )));
                }
                check(*range.start())?;
                check(*range.end())?;
            }
            PageSelection::List(pages) => {
                for p in pages {
                    check(*p)?;
                }
            }
        }

        Ok((1..=page_count).filter(|p| self.includes(*p)).collect())
    }

    /// Parse a page selection string (e.g., "3", "1-10", "1,3,5,7-10").
    ///
    /// Page numbers above [`MAX_PAGE_NUMBER`] are rejected.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        let invalid = || Error::InvalidPageRange(s.to_string());
        let number = |part: &str| -> Result<usize> {
            match part.trim().parse::<usize>() {
                Ok(n) if n <= MAX_PAGE_NUMBER => Ok(n),
                _ => Err(invalid()),
            }
        };

        if s.is_empty() || s == "all" {
            return Ok(PageSelection::All);
        }

        if !s.contains(',') {
            if let Some((start, end)) = s.split_once('-') {
                return Ok(PageSelection::Range(number(start)?..=number(end)?));
            }
            return Ok(PageSelection::Single(number(s)?));
        }

        let mut pages = Vec::new();
        for part in s.split(',') {
            if let Some((start, end)) = part.split_once('-') {
                let (start, end) = (number(start)?, number(end)?);
                if start > end {
                    return Err(invalid());
                }
                pages.extend(start..=end);
            } else {
                pages.push(number(part)?);
            }
        }

        pages.sort_unstable();
        pages.dedup();
        Ok(PageSelection::List(pages))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_options_builder() {
        let options = ConvertOptions::new()
            .editable_text()
            .high_quality()
            .sequential()
            .with_opacity_policy(OpacityPolicy::Preserve);

        assert!(!options.rasterize_text);
        assert_eq!(options.enhance_quality.factor(), 3);
        assert!(!options.parallel);
        assert_eq!(options.opacity_policy, OpacityPolicy::Preserve);
    }

    #[test]
    fn test_default_options() {
        let options = ConvertOptions::default();
        assert!(options.rasterize_text);
        assert!(options.enhance_images);
        assert_eq!(options.enhance_quality.factor(), 2);
        assert_eq!(options.placeholder_color, [204, 204, 204, 255]);
        assert_eq!(options.archive_name, "pages.zip");
    }

    #[test]
    fn test_opacity_policy() {
        for opacity in [0u8, 128, 255] {
            assert_eq!(OpacityPolicy::ForceOpaque.apply(opacity), 1.0);
        }
        assert_eq!(OpacityPolicy::Preserve.apply(0), 0.0);
        assert_eq!(OpacityPolicy::Preserve.apply(255), 1.0);
    }

    #[test]
    fn test_page_selection_parse() {
        assert_eq!(PageSelection::parse("all").unwrap(), PageSelection::All);
        assert_eq!(PageSelection::parse("2").unwrap(), PageSelection::Single(2));
        assert_eq!(PageSelection::parse("1-3").unwrap(), PageSelection::Range(1..=3));
        assert_eq!(
            PageSelection::parse("5,1-2,2").unwrap(),
            PageSelection::List(vec![1, 2, 5])
        );
        assert!(PageSelection::parse("x-2").is_err());
        assert!(PageSelection::parse("1,3-2").is_err());
    }

    #[test]
    fn test_page_selection_parse_bounded() {
        assert!(PageSelection::parse("1-4000000000").is_err());
        assert!(PageSelection::parse("1,2-4000000000").is_err());
        assert!(PageSelection::parse("99999").is_err());
        assert_eq!(
            PageSelection::parse("1-10000").unwrap(),
            PageSelection::Range(1..=MAX_PAGE_NUMBER)
        );
    }

    #[test]
    fn test_page_selection_resolve() {
        assert_eq!(PageSelection::All.resolve(3).unwrap(), vec![1, 2, 3]);
        assert_eq!(PageSelection::Range(2..=3).resolve(3).unwrap(), vec![2, 3]);
        assert!(PageSelection::Single(4).resolve(3).is_err());
        assert!(PageSelection::Single(0).resolve(3).is_err());
        assert!(PageSelection::List(vec![1, 9]).resolve(3).is_err());
        assert_eq!(
            PageSelection::List(vec![3, 1, 3]).resolve(3).unwrap(),
            vec![1, 3]
        );
    }
}
