//! Maps an ordered preset list onto one output group and its stream
//! assemblies.

use crate::core::{Preset, ProviderError};

use super::NAME;
use super::api::{Container, Location, Output, OutputGroup, OutputGroupType, StreamAssembly};

pub const DEFAULT_OUTPUT_GROUP_ORDER: u32 = 1;
pub const DEFAULT_CONTAINER: Container = Container::MPEG4;

/// Resolve a preset extension to a container. The flag is true for adaptive
/// streaming extensions.
pub fn resolve_container(extension: &str) -> (Container, bool) {
    let ext = extension.trim_start_matches('.');
    match ext.to_ascii_lowercase().as_str() {
        "ts" | "hls" | "m3u8" => (Container::APPLE_HTTP_LIVE_STREAMING, true),
        "" => (DEFAULT_CONTAINER, false),
        _ => (Container::new(ext), false),
    }
}

/// Build the single output group for `presets`, writing to `destination`.
///
/// Output `i` reads from stream assembly `stream_<i>`. If any preset uses an
/// adaptive streaming container the whole group becomes an Apple Live group.
/// Fails with [`ProviderError::PresetNotFound`] if a preset has no mapping for
/// this backend.
pub fn build_output_group(
    destination: Location,
    presets: &[Preset],
) -> Result<(OutputGroup, Vec<StreamAssembly>), ProviderError> {
    let mut outputs = Vec::with_capacity(presets.len());
    let mut stream_assemblies = Vec::with_capacity(presets.len());
    let mut adaptive_streaming = false;

    for (index, preset) in presets.iter().enumerate() {
        let stream_assembly_name = format!("stream_{index}");
        let (container, adaptive) = resolve_container(&preset.output_opts.extension);
        adaptive_streaming |= adaptive;

        let preset_id = preset
            .preset_id_for(NAME)
            .ok_or_else(|| ProviderError::PresetNotFound {
                preset: preset.name.clone(),
            })?;

        outputs.push(Output {
            stream_assembly_name: stream_assembly_name.clone(),
            name_modifier: format!("_{}", preset.name),
            order: index,
            container,
        });
        stream_assemblies.push(StreamAssembly {
            name: stream_assembly_name,
            preset: preset_id.to_string(),
        });
    }

    let kind = if adaptive_streaming {
        OutputGroupType::AppleLive
    } else {
        OutputGroupType::File
    };

    let group = OutputGroup {
        order: DEFAULT_OUTPUT_GROUP_ORDER,
        kind,
        destination,
        outputs,
    };

    Ok((group, stream_assemblies))
}
