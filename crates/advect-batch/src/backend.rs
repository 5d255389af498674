//! Execution backends.
//!
//! A backend runs a per-lane kernel over a [`Partition`] of a batch. Every
//! backend visits each lane exactly once; they differ only in how lanes are
//! grouped onto threads:
//!
//! - [`Serial`]: one thread, lanes in index order.
//! - [`MultiCore`]: recursive halving with `rayon::join` down to a grain.
//! - [`Simt`]: fixed-width blocks, one rayon task per block, lanes within a
//!   block in order.
//!
//! Partitions hand out disjoint `&mut` slices, so kernels never share a
//! particle's slots and no synchronization is needed inside a lane.

/// A splittable, thread-transferable window over batch buffers.
pub trait Partition: Send + Sized {
    /// Number of lanes in this window.
    fn len(&self) -> usize;

    /// Whether the window holds no lanes.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Split into `[0, mid)` and `[mid, len)`.
    fn split_at(self, mid: usize) -> (Self, Self);
}

/// Runs a kernel once per lane of a partition.
pub trait Backend: Send + Sync {
    /// Short name for logs and benchmarks.
    fn name(&self) -> &'static str;

    /// Invoke `kernel(part, lane)` for every `lane` in `0..part.len()`.
    ///
    /// `lane` is local to the partition the kernel receives; partitions that
    /// need global indices carry their own offset.
    fn dispatch<P, F>(&self, part: P, kernel: F)
    where
        P: Partition,
        F: Fn(&mut P, usize) + Sync;
}

/// Single-threaded backend.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Serial;

impl Backend for Serial {
    fn name(&self) -> &'static str {
        "serial"
    }

    fn dispatch<P, F>(&self, mut part: P, kernel: F)
    where
        P: Partition,
        F: Fn(&mut P, usize) + Sync,
    {
        for lane in 0..part.len() {
            kernel(&mut part, lane);
        }
    }
}

/// Work-stealing backend on the global rayon pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MultiCore {
    grain: usize,
}

impl MultiCore {
    /// Default number of lanes below which a window is not split further.
    pub const DEFAULT_GRAIN: usize = 256;

    /// Create a backend that stops splitting at `grain` lanes. Zero is
    /// clamped to one.
    pub fn new(grain: usize) -> Self {
        Self {
            grain: grain.max(1),
        }
    }

    /// Lanes per leaf task.
    pub fn grain(&self) -> usize {
        self.grain
    }
}

impl Default for MultiCore {
    fn default() -> Self {
        Self::new(Self::DEFAULT_GRAIN)
    }
}

fn split_join<P, F>(mut part: P, grain: usize, kernel: &F)
where
    P: Partition,
    F: Fn(&mut P, usize) + Sync,
{
    let len = part.len();
    if len <= grain {
        for lane in 0..len {
            kernel(&mut part, lane);
        }
        return;
    }
    let (left, right) = part.split_at(len / 2);
    rayon::join(
        || split_join(left, grain, kernel),
        || split_join(right, grain, kernel),
    );
}

impl Backend for MultiCore {
    fn name(&self) -> &'static str {
        "multicore"
    }

    fn dispatch<P, F>(&self, part: P, kernel: F)
    where
        P: Partition,
        F: Fn(&mut P, usize) + Sync,
    {
        split_join(part, self.grain, &kernel);
    }
}

/// Block-structured backend: lanes are grouped into blocks of a fixed
/// width and each block runs as one task.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Simt {
    block_dim: usize,
}

impl Simt {
    /// Default block width.
    pub const DEFAULT_BLOCK_DIM: usize = 128;

    /// Create a backend with `block_dim` lanes per block. Zero is clamped
    /// to one.
    pub fn new(block_dim: usize) -> Self {
        Self {
            block_dim: block_dim.max(1),
        }
    }

    /// Lanes per block.
    pub fn block_dim(&self) -> usize {
        self.block_dim
    }
}

impl Default for Simt {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BLOCK_DIM)
    }
}

impl Backend for Simt {
    fn name(&self) -> &'static str {
        "simt"
    }

    fn dispatch<P, F>(&self, part: P, kernel: F)
    where
        P: Partition,
        F: Fn(&mut P, usize) + Sync,
    {
        let kernel = &kernel;
        let block_dim = self.block_dim;
        rayon::scope(move |s| {
            let mut rest = part;
            while !rest.is_empty() {
                let take = block_dim.min(rest.len());
                let (mut block, tail) = rest.split_at(take);
                rest = tail;
                s.spawn(move |_| {
                    for lane in 0..block.len() {
                        kernel(&mut block, lane);
                    }
                });
            }
        });
    }
}

/// Runtime-selected backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Device {
    /// See [`Serial`].
    Serial(Serial),
    /// See [`MultiCore`].
    MultiCore(MultiCore),
    /// See [`Simt`].
    Simt(Simt),
}

impl Default for Device {
    fn default() -> Self {
        Self::Serial(Serial)
    }
}

impl From<Serial> for Device {
    fn from(b: Serial) -> Self {
        Self::Serial(b)
    }
}

impl From<MultiCore> for Device {
    fn from(b: MultiCore) -> Self {
        Self::MultiCore(b)
    }
}

impl From<Simt> for Device {
    fn from(b: Simt) -> Self {
        Self::Simt(b)
    }
}

impl Backend for Device {
    fn name(&self) -> &'static str {
        match self {
            Self::Serial(b) => b.name(),
            Self::MultiCore(b) => b.name(),
            Self::Simt(b) => b.name(),
        }
    }

    fn dispatch<P, F>(&self, part: P, kernel: F)
    where
        P: Partition,
        F: Fn(&mut P, usize) + Sync,
    {
        match self {
            Self::Serial(b) => b.dispatch(part, kernel),
            Self::MultiCore(b) => b.dispatch(part, kernel),
            Self::Simt(b) => b.dispatch(part, kernel),
        }
    }
}
