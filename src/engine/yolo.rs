use std::ffi::CString;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;
use std::ptr::NonNull;

use super::{DetectionEngine, EngineError, ModelHandle};

mod ffi {
    use std::ffi::c_char;

    /// Opaque model instance owned by the native library
    #[repr(C)]
    pub(super) struct RawModel {
        _private: [u8; 0],
    }

    #[link(name = "YOLO")]
    unsafe extern "C" {
        pub(super) fn load_model(model_path: *const c_char) -> *mut RawModel;
        pub(super) fn process_frame(
            model: *mut RawModel,
            image_path: *const c_char,
            output_path: *const c_char,
        );
        pub(super) fn release_model(model: *mut RawModel);
    }
}

/// Engine backed by the native YOLOv8 shared library
pub struct YoloEngine;

impl DetectionEngine for YoloEngine {
    fn name(&self) -> &'static str {
        "yolo"
    }

    fn load_model(&self, model_path: &Path) -> Result<Box<dyn ModelHandle>, EngineError> {
        let c_model = path_to_cstring(model_path)?;

        // Null signals the native side failed to load the TorchScript file.
        let raw = unsafe { ffi::load_model(c_model.as_ptr()) };
        let raw = NonNull::new(raw).ok_or_else(|| {
            EngineError::ModelLoad(format!(
                "native load returned null for {}",
                model_path.display()
            ))
        })?;

        tracing::debug!("native model loaded from {}", model_path.display());
        Ok(Box::new(YoloModel { raw }))
    }
}

/// Owned native model handle, released on drop
struct YoloModel {
    raw: NonNull<ffi::RawModel>,
}

// The handle is only ever used from one blocking task at a time; the native
// library keeps no thread affinity for a loaded model.
unsafe impl Send for YoloModel {}

impl ModelHandle for YoloModel {
    fn process_frame(&mut self, frame_path: &Path, output_path: &Path) -> Result<(), EngineError> {
        let c_input = path_to_cstring(frame_path)?;
        let c_output = path_to_cstring(output_path)?;

        unsafe { ffi::process_frame(self.raw.as_ptr(), c_input.as_ptr(), c_output.as_ptr()) };

        // The native call returns no status; the output file it was asked to
        // write is the only observable signal of success.
        if !output_path.is_file() {
            return Err(EngineError::Processing(format!(
                "no output written to {}",
                output_path.display()
            )));
        }
        Ok(())
    }
}

impl Drop for YoloModel {
    fn drop(&mut self) {
        unsafe { ffi::release_model(self.raw.as_ptr()) };
    }
}

fn path_to_cstring(path: &Path) -> Result<CString, EngineError> {
    CString::new(path.as_os_str().as_bytes())
        .map_err(|_| EngineError::InvalidPath(path.display().to_string()))
}
