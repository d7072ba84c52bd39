use image::Luma;
use imageproc::definitions::Image;

use crate::error::Error;
use crate::utils::validate_non_empty_image;

/// Per-pixel category used while refining a segmentation
///
/// The discriminants follow the usual GrabCut numbering so label masks can
/// be exchanged with other tools as raw bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Label {
    /// Definite background, never relabeled
    Background = 0,
    /// Definite foreground, never relabeled
    Foreground = 1,
    /// Background that the refiner may move to foreground
    ProbableBackground = 2,
    /// Foreground that the refiner may move to background
    ProbableForeground = 3,
}

impl Label {
    /// Whether the label belongs to the foreground class
    #[inline]
    pub const fn is_foreground(self) -> bool {
        matches!(self, Self::Foreground | Self::ProbableForeground)
    }

    /// Whether the refiner must leave this label untouched
    #[inline]
    pub const fn is_fixed(self) -> bool {
        matches!(self, Self::Background | Self::Foreground)
    }

    /// Decodes a raw GrabCut label byte
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Background),
            1 => Some(Self::Foreground),
            2 => Some(Self::ProbableBackground),
            3 => Some(Self::ProbableForeground),
            _ => None,
        }
    }
}

/// Grid of [`Label`]s sharing the dimensions of the image being segmented
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelMask {
    width: u32,
    height: u32,
    labels: Vec<Label>,
}

impl LabelMask {
    /// Creates a mask with every pixel set to `fill`
    pub fn new(width: u32, height: u32, fill: Label) -> Result<Self, Error> {
        validate_non_empty_image(width, height)?;
        Ok(Self {
            width,
            height,
            labels: vec![fill; width as usize * height as usize],
        })
    }

    /// Builds a fixed-label mask from a binary mask (non-zero is foreground)
    pub fn from_binary_mask(mask: &Image<Luma<u8>>) -> Result<Self, Error> {
        let (width, height) = mask.dimensions();
        validate_non_empty_image(width, height)?;
        let labels = mask
            .pixels()
            .map(|Luma([value])| {
                if *value > 0 {
                    Label::Foreground
                } else {
                    Label::Background
                }
            })
            .collect();
        Ok(Self {
            width,
            height,
            labels,
        })
    }

    #[inline]
    pub const fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub const fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Label at `(x, y)`
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are out of bounds.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Label {
        assert!(x < self.width && y < self.height, "label ({x}, {y}) out of bounds");
        self.labels[self.index(x, y)]
    }

    /// Sets the label at `(x, y)`
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are out of bounds.
    #[inline]
    pub fn set(&mut self, x: u32, y: u32, label: Label) {
        assert!(x < self.width && y < self.height, "label ({x}, {y}) out of bounds");
        let index = self.index(x, y);
        self.labels[index] = label;
    }

    /// Labels in row-major order
    #[inline]
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    #[inline]
    pub(crate) fn labels_mut(&mut self) -> &mut [Label] {
        &mut self.labels
    }

    /// Number of pixels carrying `label`
    pub fn category_count(&self, label: Label) -> usize {
        self.labels.iter().filter(|&&l| l == label).count()
    }

    /// True when every pixel is in the same class (all foreground or all
    /// background), leaving nothing for a color model to separate
    pub fn is_degenerate(&self) -> bool {
        let foreground = self.labels.iter().filter(|l| l.is_foreground()).count();
        foreground == 0 || foreground == self.labels.len()
    }

    /// Collapses the four categories into a binary mask of 0 and 1
    pub fn to_binary_mask(&self) -> Image<Luma<u8>> {
        Image::from_fn(self.width, self.height, |x, y| {
            Luma([u8::from(self.get(x, y).is_foreground())])
        })
    }
}
