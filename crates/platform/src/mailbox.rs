//! Frame-buffer-allocation mailbox abstraction.
//!
//! The real collaborator is the VideoCore mailbox property interface: a
//! sequence of property-tag requests that allocate a linear frame buffer,
//! set its physical/virtual resolution, set color depth, install a
//! palette, and report the resulting pitch and base address. This crate
//! only states that interface; issuing the actual mailbox transaction is
//! out of scope.

/// Requested frame buffer geometry for a mode switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameBufferSpec {
    /// Physical (visible) width, in pixels.
    pub xres: u32,
    /// Physical (visible) height, in pixels.
    pub yres_phys: u32,
    /// Virtual height, in pixels — `yres_phys * pages`, enabling page flips
    /// by sliding the visible window's y-offset.
    pub yres_virt: u32,
    /// Color depth in bits per pixel. This emulator always requests 8.
    pub depth: u32,
}

/// Result of a successful allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameBufferHandle {
    /// Bytes per pixel row. May exceed `xres` due to hardware alignment.
    pub pitch: u32,
    /// Total size of the allocated buffer, in bytes.
    pub size: u32,
}

/// Errors the mailbox can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailboxError {
    /// The property-tag transaction failed or returned an error response.
    TransactionFailed,
    /// The requested geometry was rejected (e.g. virtual height exceeds limits).
    InvalidGeometry,
}

impl core::fmt::Display for MailboxError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::TransactionFailed => write!(f, "mailbox transaction failed"),
            Self::InvalidGeometry => write!(f, "mailbox rejected requested geometry"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for MailboxError {}

/// Allocates and reconfigures the linear frame buffer and its palette.
pub trait Mailbox {
    /// Allocate (or reallocate) the frame buffer for the given geometry and
    /// install the given 16-entry BGR palette. Returns the pitch and total
    /// size actually granted.
    fn allocate(
        &mut self,
        spec: FrameBufferSpec,
        palette_bgr: &[[u8; 3]; 16],
    ) -> Result<FrameBufferHandle, MailboxError>;

    /// Slide the visible window to the given page's y-offset
    /// (`page * yres_phys`).
    fn set_page_offset(&mut self, y_offset: u32) -> Result<(), MailboxError>;

    /// Raw mutable access to the allocated pixel plane.
    ///
    /// Length is always the `size` returned by the most recent [`allocate`](Self::allocate).
    fn framebuffer_mut(&mut self) -> &mut [u8];
}
