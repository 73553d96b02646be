use std::path::{Path, PathBuf};

use roxmltree::Node;
use tracing::{debug, info};

use crate::clip::sidecar::read_capture_timestamp;
use crate::clip::types::{parse_frame_rate, ClipRecord};
use crate::config::{Config, MetadataConfig};
use crate::error::{ManifestError, Result};

/// Locate MEDIAPRO.xml beneath `root` and extract every clip it lists.
///
/// A missing manifest is fatal for the whole run and is reported as
/// [`ManifestError::NotFound`].
pub fn extract_clips<P: AsRef<Path>>(root: P, config: &Config) -> Result<Vec<ClipRecord>> {
    let root = root.as_ref();
    let manifest_path = config.manifest_path(root);

    if !manifest_path.is_file() {
        return Err(ManifestError::NotFound {
            path: manifest_path.display().to_string(),
        }.into());
    }

    info!("Reading manifest {:?}", manifest_path);
    let content = std::fs::read_to_string(&manifest_path)?;

    let clips = parse_manifest(
        &content,
        &manifest_path,
        &config.bpav_root(root),
        &config.metadata,
    )?;

    info!("Manifest lists {} clips", clips.len());
    Ok(clips)
}

/// Map a MEDIAPRO.xml document to clip records, one per `<Material>`, in
/// document order.
///
/// `manifest_path` is only used in error messages. Essence and sidecar URIs
/// are resolved beneath `bpav_root`.
pub fn parse_manifest(
    xml: &str,
    manifest_path: &Path,
    bpav_root: &Path,
    metadata: &MetadataConfig,
) -> Result<Vec<ClipRecord>> {
    let doc = roxmltree::Document::parse(xml).map_err(|e| ManifestError::Xml {
        path: manifest_path.display().to_string(),
        reason: e.to_string(),
    })?;

    let ns = metadata.media_profile_namespace.as_str();

    doc.descendants()
        .filter(|n| n.has_tag_name((ns, "Material")))
        .enumerate()
        .map(|(index, material)| parse_material(material, index, bpav_root, metadata))
        .collect()
}

/// Join a manifest URI beneath the BPAV root.
///
/// Leading `.` and `/` characters are stripped, so `./Clip/C0001.MP4` lands
/// at `<bpav>/Clip/C0001.MP4`.
pub fn resolve_uri(bpav_root: &Path, uri: &str) -> PathBuf {
    bpav_root.join(uri.trim_start_matches(|c: char| c == '.' || c == '/'))
}

fn parse_material(
    material: Node,
    index: usize,
    bpav_root: &Path,
    metadata: &MetadataConfig,
) -> Result<ClipRecord> {
    let ns = metadata.media_profile_namespace.as_str();
    let label = material
        .attribute("uri")
        .map(str::to_string)
        .unwrap_or_else(|| format!("#{}", index + 1));

    let identifier = required(material, "uri", &label)?.to_string();

    let fps = required(material, "fps", &label)?;
    let (frame_rate, scan_mode) = parse_frame_rate(fps)
        .ok_or_else(|| invalid(&label, "fps", fps))?;

    let duration_frames = parse_number(material, "dur", &label)?;
    let audio_channels = parse_number(material, "ch", &label)?;
    let aspect_ratio = required(material, "aspectRatio", &label)?.to_string();

    let component = material
        .children()
        .find(|n| n.has_tag_name((ns, "Component")))
        .ok_or_else(|| ManifestError::MissingElement {
            clip: label.clone(),
            element: "Component".to_string(),
        })?;

    let source_path = resolve_uri(bpav_root, required(component, "uri", &label)?);
    let video_essence_type = required(component, "videoType", &label)?.to_string();
    let audio_essence_type = required(component, "audioType", &label)?.to_string();

    // Only the first XML-typed RelevantInfo is consulted
    let capture_timestamp = material
        .children()
        .filter(|n| n.has_tag_name((ns, "RelevantInfo")))
        .find(|n| n.attribute("type") == Some(metadata.sidecar_info_type.as_str()))
        .and_then(|info| info.attribute("uri"))
        .and_then(|uri| {
            read_capture_timestamp(&resolve_uri(bpav_root, uri), &metadata.non_realtime_namespace)
        });

    debug!(
        "Material {}: {} frames @ {} fps ({}), captured {:?}",
        label, duration_frames, frame_rate, scan_mode, capture_timestamp
    );

    Ok(ClipRecord {
        identifier,
        source_path,
        duration_frames,
        frame_rate,
        scan_mode,
        aspect_ratio,
        audio_channels,
        video_essence_type,
        audio_essence_type,
        capture_timestamp,
    })
}

fn required<'a>(node: Node<'a, '_>, attribute: &str, clip: &str) -> Result<&'a str> {
    node.attribute(attribute).ok_or_else(|| {
        ManifestError::MissingAttribute {
            clip: clip.to_string(),
            attribute: attribute.to_string(),
        }.into()
    })
}

fn parse_number<T: std::str::FromStr>(node: Node, attribute: &str, clip: &str) -> Result<T> {
    let raw = required(node, attribute, clip)?;
    raw.trim()
        .parse()
        .map_err(|_| invalid(clip, attribute, raw).into())
}

fn invalid(clip: &str, attribute: &str, value: &str) -> ManifestError {
    ManifestError::InvalidAttribute {
        clip: clip.to_string(),
        attribute: attribute.to_string(),
        value: value.to_string(),
    }
}
