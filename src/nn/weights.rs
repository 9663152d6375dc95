//! Weight persistence: save/load `DualHeadNet` parameters to disk.
//!
//! Saves are atomic (write to a temp file, then `rename` over the target)
//! so a crash mid-write never leaves a corrupt weights file behind for the
//! next generation to load (spec §5 "atomic weight persistence").

use std::path::{Path, PathBuf};

use burn::module::Module;
use burn::record::{FullPrecisionSettings, NamedMpkFileRecorder, Recorder};
use burn::tensor::backend::Backend;

use crate::error::{ShogiError, ShogiResult};
use crate::nn::config::NetConfig;
use crate::nn::net::DualHeadNet;

type FileRecorder = NamedMpkFileRecorder<FullPrecisionSettings>;

pub fn save<B: Backend>(model: &DualHeadNet<B>, path: &Path) -> ShogiResult<()> {
    let tmp_path = tmp_path_for(path);
    let recorder = FileRecorder::new();
    model
        .clone()
        .save_file(&tmp_path, &recorder)
        .map_err(|e| ShogiError::InferenceFailure(format!("failed to encode weights: {e}")))?;

    // `save_file` appends the recorder's extension; rename the artifact it
    // actually produced, not our bare temp stem.
    let tmp_with_ext = with_mpk_extension(&tmp_path);
    let final_with_ext = with_mpk_extension(path);
    std::fs::rename(&tmp_with_ext, &final_with_ext)?;
    Ok(())
}

pub fn load<B: Backend>(config: &NetConfig, path: &Path, device: &B::Device) -> ShogiResult<DualHeadNet<B>> {
    let model = DualHeadNet::new(config, device);
    let recorder = FileRecorder::new();
    let record = recorder
        .load(path.to_path_buf(), device)
        .map_err(|e| ShogiError::InferenceFailure(format!("failed to load weights from {path:?}: {e}")))?;
    Ok(model.load_record(record))
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let file_name = tmp.file_name().and_then(|n| n.to_str()).unwrap_or("weights");
    tmp.set_file_name(format!("{file_name}.tmp"));
    tmp
}

fn with_mpk_extension(path: &Path) -> PathBuf {
    let mut p = path.to_path_buf();
    p.set_extension("mpk");
    p
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tmp_path_is_sibling_with_tmp_suffix() {
        let path = PathBuf::from("/models/gen_003");
        let tmp = tmp_path_for(&path);
        assert_eq!(tmp, PathBuf::from("/models/gen_003.tmp"));
    }

    #[test]
    fn mpk_extension_is_appended() {
        let path = PathBuf::from("/models/gen_003");
        assert_eq!(with_mpk_extension(&path), PathBuf::from("/models/gen_003.mpk"));
    }
}
