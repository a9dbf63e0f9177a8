//! Decoding of strided vertex attributes and index arrays out of raw blobs.

use glam::{Vec2, Vec3, Vec4};

use crate::error::{Result, SceneError};

/// Element formats accepted for vertex attributes.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AttributeFormat {
    R32G32Sfloat,
    R32G32B32Sfloat,
    R32G32B32A32Sfloat,
    R8G8B8A8Unorm,
}

impl AttributeFormat {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "R32G32_SFLOAT" => Some(Self::R32G32Sfloat),
            "R32G32B32_SFLOAT" => Some(Self::R32G32B32Sfloat),
            "R32G32B32A32_SFLOAT" => Some(Self::R32G32B32A32Sfloat),
            "R8G8B8A8_UNORM" => Some(Self::R8G8B8A8Unorm),
            _ => None,
        }
    }

    /// Size of one element in bytes.
    pub fn byte_size(self) -> usize {
        match self {
            Self::R32G32Sfloat => 8,
            Self::R32G32B32Sfloat => 12,
            Self::R32G32B32A32Sfloat => 16,
            Self::R8G8B8A8Unorm => 4,
        }
    }

    pub fn components(self) -> usize {
        match self {
            Self::R32G32Sfloat => 2,
            Self::R32G32B32Sfloat => 3,
            Self::R32G32B32A32Sfloat | Self::R8G8B8A8Unorm => 4,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum IndexFormat {
    Uint16,
    Uint32,
}

impl IndexFormat {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "UINT16" => Some(Self::Uint16),
            "UINT32" => Some(Self::Uint32),
            _ => None,
        }
    }

    pub fn byte_size(self) -> usize {
        match self {
            Self::Uint16 => 2,
            Self::Uint32 => 4,
        }
    }
}

/// Where one attribute lives inside a blob.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeLayout {
    pub src: String,
    pub offset: usize,
    pub stride: usize,
    pub format: AttributeFormat,
}

impl AttributeLayout {
    /// Number of whole elements available in a blob of `len` bytes.
    pub fn available(&self, len: usize) -> usize {
        match self.offset.checked_add(self.format.byte_size()) {
            Some(end) if self.stride != 0 && end <= len => (len - end) / self.stride + 1,
            _ => 0,
        }
    }
}

fn out_of_bounds(bytes: &[u8], src: &str, offset: usize, len: usize) -> SceneError {
    SceneError::OutOfBounds {
        src: src.to_string(),
        offset,
        len,
        available: bytes.len(),
    }
}

fn checked_slice<'a>(bytes: &'a [u8], src: &str, offset: usize, len: usize) -> Result<&'a [u8]> {
    offset
        .checked_add(len)
        .and_then(|end| bytes.get(offset..end))
        .ok_or_else(|| out_of_bounds(bytes, src, offset, len))
}

fn f32_at(b: &[u8], i: usize) -> f32 {
    f32::from_le_bytes([b[i], b[i + 1], b[i + 2], b[i + 3]])
}

/// Decodes `count` elements, widening each to four components.
///
/// Missing components are zero, except `w` which defaults to one.
pub fn decode(bytes: &[u8], layout: &AttributeLayout, count: usize) -> Result<Vec<Vec4>> {
    let elem = layout.format.byte_size();
    let mut out = Vec::with_capacity(count.min(layout.available(bytes.len())));

    for i in 0..count {
        let at = i
            .checked_mul(layout.stride)
            .and_then(|step| layout.offset.checked_add(step))
            .ok_or_else(|| out_of_bounds(bytes, &layout.src, layout.offset, elem))?;
        let b = checked_slice(bytes, &layout.src, at, elem)?;

        let v = match layout.format {
            AttributeFormat::R32G32Sfloat => Vec4::new(f32_at(b, 0), f32_at(b, 4), 0.0, 1.0),
            AttributeFormat::R32G32B32Sfloat => {
                Vec4::new(f32_at(b, 0), f32_at(b, 4), f32_at(b, 8), 1.0)
            }
            AttributeFormat::R32G32B32A32Sfloat => {
                Vec4::new(f32_at(b, 0), f32_at(b, 4), f32_at(b, 8), f32_at(b, 12))
            }
            AttributeFormat::R8G8B8A8Unorm => Vec4::new(
                b[0] as f32 / 255.0,
                b[1] as f32 / 255.0,
                b[2] as f32 / 255.0,
                b[3] as f32 / 255.0,
            ),
        };
        out.push(v);
    }

    Ok(out)
}

pub fn decode_vec2(bytes: &[u8], layout: &AttributeLayout, count: usize) -> Result<Vec<Vec2>> {
    Ok(decode(bytes, layout, count)?.into_iter().map(|v| v.truncate().truncate()).collect())
}

pub fn decode_vec3(bytes: &[u8], layout: &AttributeLayout, count: usize) -> Result<Vec<Vec3>> {
    Ok(decode(bytes, layout, count)?.into_iter().map(|v| v.truncate()).collect())
}

/// Decodes `count` tightly packed little-endian indices.
pub fn decode_indices(
    bytes: &[u8],
    src: &str,
    offset: usize,
    count: usize,
    format: IndexFormat,
) -> Result<Vec<u32>> {
    let len = count
        .checked_mul(format.byte_size())
        .ok_or_else(|| out_of_bounds(bytes, src, offset, usize::MAX))?;
    let b = checked_slice(bytes, src, offset, len)?;

    let indices = match format {
        IndexFormat::Uint16 => b
            .chunks_exact(2)
            .map(|c| u16::from_le_bytes([c[0], c[1]]) as u32)
            .collect(),
        IndexFormat::Uint32 => b
            .chunks_exact(4)
            .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect(),
    };
    Ok(indices)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floats(v: &[f32]) -> Vec<u8> {
        v.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    fn layout(format: AttributeFormat, offset: usize, stride: usize) -> AttributeLayout {
        AttributeLayout { src: "blob".into(), offset, stride, format }
    }

    // ── formats ───────────────────────────────────────────────────────────

    #[test]
    fn format_names_round_trip_sizes() {
        assert_eq!(AttributeFormat::parse("R32G32B32_SFLOAT").map(|f| f.byte_size()), Some(12));
        assert_eq!(AttributeFormat::parse("R8G8B8A8_UNORM").map(|f| f.components()), Some(4));
        assert_eq!(AttributeFormat::parse("R16_SFLOAT"), None);
        assert_eq!(IndexFormat::parse("UINT32"), Some(IndexFormat::Uint32));
        assert_eq!(IndexFormat::parse("UINT8"), None);
    }

    // ── strided decode ────────────────────────────────────────────────────

    #[test]
    fn interleaved_positions_and_texcoords() {
        // pos(3f) tex(2f) per vertex, stride 20
        let bytes = floats(&[1.0, 2.0, 3.0, 0.25, 0.5, 4.0, 5.0, 6.0, 0.75, 1.0]);
        let pos = decode_vec3(&bytes, &layout(AttributeFormat::R32G32B32Sfloat, 0, 20), 2).unwrap();
        let tex = decode_vec2(&bytes, &layout(AttributeFormat::R32G32Sfloat, 12, 20), 2).unwrap();
        assert_eq!(pos, vec![Vec3::new(1.0, 2.0, 3.0), Vec3::new(4.0, 5.0, 6.0)]);
        assert_eq!(tex, vec![Vec2::new(0.25, 0.5), Vec2::new(0.75, 1.0)]);
    }

    #[test]
    fn unorm_colors_scale_to_unit_range() {
        let bytes = [255u8, 0, 51, 255];
        let c = decode(&bytes, &layout(AttributeFormat::R8G8B8A8Unorm, 0, 4), 1).unwrap();
        assert_eq!(c[0], Vec4::new(1.0, 0.0, 0.2, 1.0));
    }

    #[test]
    fn overrun_is_an_error() {
        let bytes = floats(&[1.0, 2.0, 3.0]);
        let err = decode_vec3(&bytes, &layout(AttributeFormat::R32G32B32Sfloat, 0, 12), 2);
        assert!(matches!(err, Err(SceneError::OutOfBounds { offset: 12, .. })));
    }

    #[test]
    fn available_counts_partial_stride_tail() {
        // Two elements of 12 bytes at stride 20 fit in 32 bytes.
        let l = layout(AttributeFormat::R32G32B32Sfloat, 0, 20);
        assert_eq!(l.available(32), 2);
        assert_eq!(l.available(31), 1);
        assert_eq!(l.available(11), 0);
    }

    #[test]
    fn overflowing_layouts_are_out_of_bounds() {
        let bytes = floats(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);

        let far = layout(AttributeFormat::R32G32B32Sfloat, usize::MAX, 12);
        assert_eq!(far.available(bytes.len()), 0);
        assert!(matches!(decode(&bytes, &far, 1), Err(SceneError::OutOfBounds { .. })));

        let wide = layout(AttributeFormat::R32G32B32Sfloat, 0, usize::MAX);
        assert!(matches!(decode(&bytes, &wide, 3), Err(SceneError::OutOfBounds { .. })));

        assert!(matches!(
            decode_indices(&bytes, "i", 0, usize::MAX, IndexFormat::Uint32),
            Err(SceneError::OutOfBounds { .. })
        ));
    }

    // ── indices ───────────────────────────────────────────────────────────

    #[test]
    fn indices_both_widths() {
        let b16: Vec<u8> = [0u16, 1, 2].iter().flat_map(|i| i.to_le_bytes()).collect();
        let b32: Vec<u8> = [7u32, 8].iter().flat_map(|i| i.to_le_bytes()).collect();
        assert_eq!(decode_indices(&b16, "i", 0, 3, IndexFormat::Uint16).unwrap(), vec![0, 1, 2]);
        assert_eq!(decode_indices(&b32, "i", 4, 1, IndexFormat::Uint32).unwrap(), vec![8]);
        assert!(decode_indices(&b32, "i", 4, 2, IndexFormat::Uint32).is_err());
    }
}
