//! # Alpha Quantization Engine
//!
//! Detects how a texture uses its alpha channel and snaps alpha values to the
//! few levels a target console expects.
//!
//! ```text
//! load ──▶ detect ──▶ correct (ordered bands) ──▶ save if changed
//!            │              │
//!    DetectionReport  CorrectionStats ──▶ EngineContext totals
//! ```
//!
//! Bands come from the preset catalog ([`presets`]) or are supplied ad hoc;
//! both are carried as a [`BandSource`].

pub mod batch;
pub mod correct;
pub mod detect;
pub mod presets;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, info, warn};

use crate::core::{EngineContext, PixelBuffer, ProcessingTotals};
use crate::error::{EngineError, EngineResult};
use crate::store::{FsImageStore, ImageStore};

pub use batch::{BatchOptions, BatchSummary, CorrectionResult, ItemStatus};
pub use correct::CorrectionStats;
pub use detect::{AlphaPattern, DetectionReport};
pub use presets::{BandSource, Preset, PresetMode, ThresholdBand};

/// Detection, correction and batch processing bound to one engine context.
pub struct AlphaEngine {
    context: Arc<EngineContext>,
    store: Box<dyn ImageStore>,
    preserve_gradient: bool,
}

impl AlphaEngine {
    /// Engine reading and writing files through [`FsImageStore`].
    pub fn new(context: Arc<EngineContext>) -> Self {
        Self::with_store(context, Box::new(FsImageStore::new()))
    }

    pub fn with_store(context: Arc<EngineContext>, store: Box<dyn ImageStore>) -> Self {
        Self {
            context,
            store,
            preserve_gradient: false,
        }
    }

    /// Set the `preserve_gradient` default used by [`AlphaEngine::batch_options`].
    pub fn with_preserve_gradient(mut self, preserve_gradient: bool) -> Self {
        self.preserve_gradient = preserve_gradient;
        self
    }

    pub fn preserve_gradient(&self) -> bool {
        self.preserve_gradient
    }

    /// Batch options for `source` carrying this engine's defaults.
    pub fn batch_options(&self, source: BandSource) -> BatchOptions {
        BatchOptions {
            preserve_gradient: self.preserve_gradient,
            ..BatchOptions::new(source)
        }
    }

    pub fn context(&self) -> &Arc<EngineContext> {
        &self.context
    }

    pub fn detect(&self, image: &PixelBuffer) -> EngineResult<DetectionReport> {
        detect::detect_alpha(image)
    }

    /// Correct a copy of `image` with ad-hoc bands.
    pub fn correct(
        &self,
        image: &PixelBuffer,
        bands: &[ThresholdBand],
        preserve_gradient: bool,
    ) -> EngineResult<(PixelBuffer, CorrectionStats)> {
        let mut corrected = image.clone();
        let stats = self.correct_in_place(&mut corrected, bands, preserve_gradient)?;
        Ok((corrected, stats))
    }

    /// Correct `image` in place with ad-hoc bands.
    pub fn correct_in_place(
        &self,
        image: &mut PixelBuffer,
        bands: &[ThresholdBand],
        preserve_gradient: bool,
    ) -> EngineResult<CorrectionStats> {
        self.apply(image, bands, PresetMode::for_bands(bands), preserve_gradient)
    }

    /// Correct a copy of `image` with a catalog preset.
    ///
    /// An unknown name fails before anything is processed.
    pub fn correct_with_preset(
        &self,
        image: &PixelBuffer,
        name: &str,
        preserve_gradient: bool,
    ) -> EngineResult<(PixelBuffer, CorrectionStats)> {
        let preset = presets::find_preset(name)?;
        let mut corrected = image.clone();
        let stats = self.apply(&mut corrected, preset.bands, preset.mode, preserve_gradient)?;
        Ok((corrected, stats))
    }

    fn apply(
        &self,
        image: &mut PixelBuffer,
        bands: &[ThresholdBand],
        mode: PresetMode,
        preserve_gradient: bool,
    ) -> EngineResult<CorrectionStats> {
        let stats = correct::correct_alpha_in_place(image, bands, mode, preserve_gradient)?;
        self.context.record_correction(stats.pixels_changed);
        Ok(stats)
    }

    pub fn totals(&self) -> ProcessingTotals {
        self.context.totals()
    }

    pub fn reset_totals(&self) {
        self.context.reset_totals();
    }

    /// Detect, correct and save a single file.
    pub fn process_image(&self, path: &Path, options: &BatchOptions) -> CorrectionResult {
        self.process_item(path, options, None)
    }

    /// Process `paths` in order, calling `progress(completed, total)` after each.
    pub fn process_batch(
        &self,
        paths: &[PathBuf],
        options: &BatchOptions,
        mut progress: impl FnMut(usize, usize),
    ) -> Vec<CorrectionResult> {
        let total = paths.len();
        info!("Processing {} images with '{}' bands", total, options.source.label());

        let root = if options.preserve_structure && options.output_dir.is_some() && total > 1 {
            batch::common_root(paths)
        } else {
            None
        };
        if let Some(root) = &root {
            debug!("Common root: {}", root.display());
        }

        let mut results = Vec::with_capacity(total);
        for (index, path) in paths.iter().enumerate() {
            let result = self.process_item(path, options, root.as_deref());
            match result.status {
                ItemStatus::Corrected => info!("[{}/{}] Corrected: {}", index + 1, total, path.display()),
                ItemStatus::Unchanged => debug!("[{}/{}] Unchanged: {}", index + 1, total, path.display()),
                ItemStatus::Failed => warn!(
                    "[{}/{}] Failed: {}: {}",
                    index + 1,
                    total,
                    path.display(),
                    result.error.as_ref().map(ToString::to_string).unwrap_or_default()
                ),
            }
            results.push(result);
            progress(index + 1, total);
        }

        let summary = BatchSummary::from_results(&results);
        info!(
            "Batch complete: {} total, {} corrected, {} unchanged, {} failed",
            summary.total, summary.corrected, summary.unchanged, summary.failed
        );
        results
    }

    fn process_item(&self, path: &Path, options: &BatchOptions, root: Option<&Path>) -> CorrectionResult {
        self.try_process_item(path, options, root)
            .unwrap_or_else(|error| CorrectionResult::failed(path, error))
    }

    fn try_process_item(
        &self,
        path: &Path,
        options: &BatchOptions,
        root: Option<&Path>,
    ) -> EngineResult<CorrectionResult> {
        let mut image = self.store.load(path)?;
        if !image.has_alpha() {
            return Err(EngineError::missing_alpha(path));
        }
        let detection = detect::detect_alpha(&image)?;
        let stats = self.apply(
            &mut image,
            options.source.bands(),
            options.source.mode(),
            options.preserve_gradient,
        )?;

        let mut result = CorrectionResult {
            path: path.to_path_buf(),
            status: ItemStatus::Unchanged,
            output_path: None,
            backup_path: None,
            detection: Some(detection),
            correction: Some(stats),
            error: None,
        };
        if !stats.modified {
            return Ok(result);
        }

        let output = batch::output_path_for(path, options, root);
        if options.overwrite && options.backup {
            let backup = batch::backup_path_for(path);
            self.store.copy(path, &backup)?;
            debug!("Backup created: {}", backup.display());
            result.backup_path = Some(backup);
        }
        self.store.save(&output, &image)?;

        result.status = ItemStatus::Corrected;
        result.output_path = Some(output);
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::config::BackendPreference;

    fn engine() -> AlphaEngine {
        AlphaEngine::new(Arc::new(EngineContext::new(BackendPreference::Portable)))
    }

    fn with_alpha(alpha: &[u8]) -> PixelBuffer {
        let data = alpha.iter().flat_map(|&a| [50, 60, 70, a]).collect();
        PixelBuffer::new(alpha.len() as u32, 1, 4, data).unwrap()
    }

    #[test]
    fn unknown_preset_is_reported_without_processing() {
        let engine = engine();
        let err = engine.correct_with_preset(&with_alpha(&[7]), "n64", false).unwrap_err();
        assert_eq!(err.category(), "unknown_preset");
        assert_eq!(engine.totals(), ProcessingTotals::default());
    }

    #[test]
    fn corrections_update_totals() {
        let engine = engine();
        engine.correct_with_preset(&with_alpha(&[7, 200, 255]), "ps2_binary", false).unwrap();
        engine.correct_with_preset(&with_alpha(&[0, 255]), "ps2_binary", false).unwrap();
        assert_eq!(
            engine.totals(),
            ProcessingTotals {
                images_processed: 2,
                images_modified: 1,
                pixels_modified: 2,
            }
        );
        engine.reset_totals();
        assert_eq!(engine.totals().images_processed, 0);
    }

    #[test]
    fn keep_everything_is_a_no_op() {
        let engine = engine();
        let image = with_alpha(&[3, 90, 180]);
        let (out, stats) = engine.correct(&image, &[ThresholdBand::keep(0, 255)], false).unwrap();
        assert!(!stats.modified);
        assert_eq!(stats.mode, PresetMode::Hybrid);
        assert_eq!(out, image);
    }

    #[test]
    fn batch_options_carry_engine_default() {
        let source = BandSource::preset("ps2_three_level").unwrap();
        assert!(!engine().batch_options(source.clone()).preserve_gradient);

        let engine = engine().with_preserve_gradient(true);
        let options = engine.batch_options(source);
        assert!(options.preserve_gradient);
        assert!(options.preserve_structure);
        assert!(options.backup);
    }

    #[test]
    fn in_place_correction_mutates_caller_buffer() {
        let engine = engine();
        let mut image = with_alpha(&[10, 240]);
        let bands = [ThresholdBand::snap(0, 127, 0), ThresholdBand::snap(128, 255, 255)];
        let stats = engine.correct_in_place(&mut image, &bands, false).unwrap();
        assert_eq!(stats.pixels_changed, 2);
        assert_eq!(image.alpha_plane().unwrap(), vec![0, 255]);
    }
}
