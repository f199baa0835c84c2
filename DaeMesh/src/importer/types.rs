//! Types for import progress tracking
//!
//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT

// ============================================================================
// Progress Types
// ============================================================================

/// Progress callback type for COLLADA imports
pub type ImportProgressCallback<'a> = &'a (dyn Fn(&ImportProgress) + Sync + Send);

/// Progress information during an import
///
/// `current` and `total` count import steps, except during
/// [`ImportPhase::Scanning`] where they count library sections read.
#[derive(Debug, Clone)]
pub struct ImportProgress {
    /// Current operation phase
    pub phase: ImportPhase,
    /// Current step number (1-indexed)
    pub current: usize,
    /// Total number of steps
    pub total: usize,
    /// Current document, section or item being processed (if applicable)
    pub current_item: Option<String>,
}

impl ImportProgress {
    /// Create a new progress update
    #[must_use]
    pub fn new(phase: ImportPhase, current: usize, total: usize) -> Self {
        Self {
            phase,
            current,
            total,
            current_item: None,
        }
    }

    /// Create a progress update with an item name
    #[must_use]
    pub fn with_item(
        phase: ImportPhase,
        current: usize,
        total: usize,
        item: impl Into<String>,
    ) -> Self {
        Self {
            phase,
            current,
            total,
            current_item: Some(item.into()),
        }
    }

    /// Get the progress percentage (0.0 - 1.0)
    #[must_use]
    pub fn percentage(&self) -> f32 {
        if self.total == 0 {
            1.0
        } else {
            self.current as f32 / self.total as f32
        }
    }
}

/// Phase of an import
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportPhase {
    /// Opening the document
    Opening,
    /// Scanning library sections
    Scanning,
    /// Resolving materials and texture files
    LinkingTextures,
    /// Building the final meshes
    AssemblingMeshes,
    /// Import complete
    Complete,
}

impl ImportPhase {
    /// Get a human-readable description of this phase
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Opening => "Opening document",
            Self::Scanning => "Scanning",
            Self::LinkingTextures => "Linking materials",
            Self::AssemblingMeshes => "Assembling meshes",
            Self::Complete => "Complete",
        }
    }
}
