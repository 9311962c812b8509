//! Binary persistence of a template catalog (`SPEC_FULL.md` §4.5).
//!
//! Layout: a little-endian `u32` template count, then for each template: region
//! (`x, y, width, height` as little-endian `i32`), a little-endian `u32` feature count, then each
//! feature as `(modality_index: u8, x: i32, y: i32, bin_mask: u8)`, all little-endian. There is no
//! magic prefix or version tag, matching the historical reference; a fixed byte order is the one
//! explicit extension this format makes over the original in-memory-struct dump (see
//! `SPEC_FULL.md` §4.5 and the REDESIGN FLAGS).

use std::io::{self, Read, Write};
use std::path::Path;

use crate::error::PersistError;
use crate::feature::{QuantizedMultiModFeature, Region, SparseMultiModTemplate};

pub fn save_templates(templates: &[SparseMultiModTemplate], path: impl AsRef<Path>) -> Result<(), PersistError> {
    let mut file = std::fs::File::create(path)?;
    write_templates(&mut file, templates)?;
    Ok(())
}

pub fn load_templates(path: impl AsRef<Path>) -> Result<Vec<SparseMultiModTemplate>, PersistError> {
    let mut file = std::fs::File::open(path)?;
    read_templates(&mut file)
}

pub fn write_templates<W: Write>(
    stream: &mut W,
    templates: &[SparseMultiModTemplate],
) -> io::Result<()> {
    write_u32(stream, templates.len() as u32)?;
    for template in templates {
        write_template(stream, template)?;
    }
    Ok(())
}

pub fn read_templates<R: Read>(stream: &mut R) -> Result<Vec<SparseMultiModTemplate>, PersistError> {
    let count = read_u32(stream).map_err(|_| corrupt("failed to read template count"))?;
    let mut templates = Vec::with_capacity(count as usize);
    for _ in 0..count {
        templates.push(read_template(stream)?);
    }
    Ok(templates)
}

fn write_template<W: Write>(stream: &mut W, template: &SparseMultiModTemplate) -> io::Result<()> {
    write_i32(stream, template.region.x)?;
    write_i32(stream, template.region.y)?;
    write_i32(stream, template.region.width)?;
    write_i32(stream, template.region.height)?;
    write_u32(stream, template.features.len() as u32)?;
    for feature in &template.features {
        stream.write_all(&[feature.modality_index])?;
        write_i32(stream, feature.x)?;
        write_i32(stream, feature.y)?;
        stream.write_all(&[feature.bin_mask])?;
    }
    Ok(())
}

fn read_template<R: Read>(stream: &mut R) -> Result<SparseMultiModTemplate, PersistError> {
    let region = Region {
        x: read_i32(stream).map_err(|_| corrupt("failed to read region.x"))?,
        y: read_i32(stream).map_err(|_| corrupt("failed to read region.y"))?,
        width: read_i32(stream).map_err(|_| corrupt("failed to read region.width"))?,
        height: read_i32(stream).map_err(|_| corrupt("failed to read region.height"))?,
    };
    let feature_count =
        read_u32(stream).map_err(|_| corrupt("failed to read feature count"))?;

    let mut features = Vec::with_capacity(feature_count as usize);
    for _ in 0..feature_count {
        let mut modality_index = [0u8; 1];
        stream
            .read_exact(&mut modality_index)
            .map_err(|_| corrupt("truncated stream while reading modality_index"))?;
        let x = read_i32(stream).map_err(|_| corrupt("truncated stream while reading feature.x"))?;
        let y = read_i32(stream).map_err(|_| corrupt("truncated stream while reading feature.y"))?;
        let mut bin_mask = [0u8; 1];
        stream
            .read_exact(&mut bin_mask)
            .map_err(|_| corrupt("truncated stream while reading bin_mask"))?;
        features.push(QuantizedMultiModFeature {
            modality_index: modality_index[0],
            x,
            y,
            bin_mask: bin_mask[0],
        });
    }

    Ok(SparseMultiModTemplate { region, features })
}

fn corrupt(msg: &str) -> PersistError {
    PersistError::CorruptStream(msg.to_string())
}

fn write_u32<W: Write>(stream: &mut W, value: u32) -> io::Result<()> {
    stream.write_all(&value.to_le_bytes())
}

fn write_i32<W: Write>(stream: &mut W, value: i32) -> io::Result<()> {
    stream.write_all(&value.to_le_bytes())
}

fn read_u32<R: Read>(stream: &mut R) -> io::Result<u32> {
    let mut buf = [0u8; 4];
    stream.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

fn read_i32<R: Read>(stream: &mut R) -> io::Result<i32> {
    let mut buf = [0u8; 4];
    stream.read_exact(&mut buf)?;
    Ok(i32::from_le_bytes(buf))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(feature_count: usize) -> SparseMultiModTemplate {
        SparseMultiModTemplate {
            region: Region {
                x: 0,
                y: 0,
                width: 64,
                height: 48,
            },
            features: (0..feature_count)
                .map(|i| QuantizedMultiModFeature {
                    modality_index: (i % 3) as u8,
                    x: i as i32,
                    y: (i * 2) as i32,
                    bin_mask: 1u8 << (i % 8),
                })
                .collect(),
        }
    }

    #[test]
    fn round_trips_through_a_byte_buffer() {
        let catalog = vec![template(5), template(0), template(127)];

        let mut buf = Vec::new();
        write_templates(&mut buf, &catalog).unwrap();

        let decoded = read_templates(&mut buf.as_slice()).unwrap();
        assert_eq!(decoded, catalog);
    }

    #[test]
    fn round_trips_through_disk() {
        let catalog = vec![template(3), template(63)];
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.linemod");

        save_templates(&catalog, &path).unwrap();
        let decoded = load_templates(&path).unwrap();
        assert_eq!(decoded, catalog);
    }

    #[test]
    fn truncated_stream_is_reported_as_corrupt() {
        let catalog = vec![template(10)];
        let mut buf = Vec::new();
        write_templates(&mut buf, &catalog).unwrap();
        buf.truncate(buf.len() - 3);

        let result = read_templates(&mut buf.as_slice());
        assert!(matches!(result, Err(PersistError::CorruptStream(_))));
    }

    #[test]
    fn declared_count_past_actual_data_is_reported_as_corrupt() {
        let mut buf = Vec::new();
        write_u32(&mut buf, 5).unwrap(); // claims 5 templates, supplies none
        let result = read_templates(&mut buf.as_slice());
        assert!(matches!(result, Err(PersistError::CorruptStream(_))));
    }
}
