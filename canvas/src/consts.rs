//! Shared numeric constants for the canvas crate.

// ── Notes ───────────────────────────────────────────────────────

/// Width of a freshly created note, in world units.
pub const DEFAULT_NOTE_WIDTH: f64 = 200.0;

/// Height of a freshly created note, in world units.
pub const DEFAULT_NOTE_HEIGHT: f64 = 200.0;

/// Smallest width a resize may produce, in world units.
pub const MIN_NOTE_WIDTH: f64 = 120.0;

/// Smallest height a resize may produce, in world units.
pub const MIN_NOTE_HEIGHT: f64 = 80.0;

/// Magnitude of the random tilt given to new notes, in degrees.
pub const MAX_NOTE_TILT_DEG: f64 = 2.0;

// ── Camera ──────────────────────────────────────────────────────

/// Furthest zoom-out factor.
pub const MIN_ZOOM: f64 = 0.1;

/// Furthest zoom-in factor.
pub const MAX_ZOOM: f64 = 5.0;

/// Wheel delta to zoom exponent conversion for Ctrl/Meta + wheel.
pub const ZOOM_SENSITIVITY: f64 = 0.002;

/// World-unit padding around the notes when fitting the view.
pub const FIT_PADDING: f64 = 100.0;

// ── Placement ───────────────────────────────────────────────────

/// Gap kept between notes by placement and de-overlap, in world units.
pub const PLACEMENT_GAP: f64 = 20.0;

/// Angle increment of the placement spiral, in radians.
pub const SPIRAL_ANGLE_STEP: f64 = 0.5;

/// Spiral radius at angle zero.
pub const SPIRAL_BASE_RADIUS: f64 = 50.0;

/// Spiral radius growth per radian.
pub const SPIRAL_RADIUS_PER_RAD: f64 = 10.0;

/// Candidates tried before the placement spiral gives up.
pub const SPIRAL_MAX_ITERATIONS: usize = 500;

/// Half-width of the random jitter used when the spiral is exhausted.
pub const FALLBACK_JITTER: f64 = 100.0;

/// Maximum relaxation passes of `resolve_overlaps`.
pub const RESOLVE_MAX_PASSES: usize = 50;

// ── Interaction ─────────────────────────────────────────────────

/// Edge distance under which a dragged note snaps to another note's edge.
pub const SNAP_THRESHOLD: f64 = 12.0;

/// Lower bound of the center distance that arms a merge.
pub const MERGE_MIN_DISTANCE: f64 = 80.0;

/// Divisor applied to the summed short sides of the two notes.
pub const MERGE_SIZE_DIVISOR: f64 = 4.0;

/// Selection boxes smaller than this on both axes are treated as a click.
pub const CLICK_BOX_THRESHOLD: f64 = 5.0;

/// Screen-space hit slop in pixels for resize handles.
pub const HANDLE_RADIUS_PX: f64 = 8.0;

// ── Export ──────────────────────────────────────────────────────

/// Height of the row bands used to order notes in Markdown export.
pub const EXPORT_ROW_BAND: f64 = 100.0;

/// Line height of note text in SVG export.
pub const SVG_LINE_HEIGHT: f64 = 18.0;
