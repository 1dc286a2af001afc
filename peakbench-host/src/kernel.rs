//! Host Kernels
//!
//! Every kernel has the same shape: each element loads `a` and `b` from
//! storage, converts them to the arithmetic format, runs `loops` iterations
//! of eight chained `c = a * c + b` per lane, converts back and stores `c`.
//! Dot-product kernels replace the per-lane multiply-add with a four-wide
//! dot product accumulated into a wider type.
//!
//! Packed fp16 storage is held as plain `f16` on the host; packing pairs into
//! 32-bit words only changes the layout, not the element count.

use half::{bf16, f16};
use peakbench_core::{ArithmeticFormat, ParallelMode, StorageFormat};
use rayon::prelude::*;
use std::hint::black_box;

/// Chained multiply-adds per loop iteration
pub const CHAIN: u64 = 8;

/// Elements handed to one rayon task at minimum
const MIN_TASK_ELEMENTS: usize = 1024;

/// A numeric element the host kernels can store or compute with
pub(crate) trait Lane: Copy + Send + Sync + 'static {
    fn from_f64(v: f64) -> Self;
    fn to_f64(self) -> f64;
    fn mul(self, rhs: Self) -> Self;
    fn add(self, rhs: Self) -> Self;

    /// Seed for input `a`, close to one so float chains stay finite
    fn seed_a(i: usize) -> Self {
        Self::from_f64(1.0 - (i % 16) as f64 / 1024.0)
    }

    /// Seed for input `b`
    fn seed_b(i: usize) -> Self {
        Self::from_f64(((i % 5) + 1) as f64 / 64.0)
    }

    #[inline(always)]
    fn convert<T: Lane>(self) -> T {
        T::from_f64(self.to_f64())
    }
}

macro_rules! float_lane {
    ($($t:ty),*) => {$(
        impl Lane for $t {
            #[inline(always)]
            fn from_f64(v: f64) -> Self {
                v as $t
            }
            #[inline(always)]
            fn to_f64(self) -> f64 {
                self as f64
            }
            #[inline(always)]
            fn mul(self, rhs: Self) -> Self {
                self * rhs
            }
            #[inline(always)]
            fn add(self, rhs: Self) -> Self {
                self + rhs
            }
        }
    )*};
}

macro_rules! int_lane {
    ($($t:ty),*) => {$(
        impl Lane for $t {
            #[inline(always)]
            fn from_f64(v: f64) -> Self {
                v as $t
            }
            #[inline(always)]
            fn to_f64(self) -> f64 {
                self as f64
            }
            #[inline(always)]
            fn mul(self, rhs: Self) -> Self {
                self.wrapping_mul(rhs)
            }
            #[inline(always)]
            fn add(self, rhs: Self) -> Self {
                self.wrapping_add(rhs)
            }
            // Small odd multipliers, nonzero addends; fits every integer lane
            fn seed_a(i: usize) -> Self {
                (2 * (i % 8) + 1) as $t
            }
            fn seed_b(i: usize) -> Self {
                ((i % 5) + 1) as $t
            }
        }
    )*};
}

macro_rules! half_lane {
    ($($t:ty),*) => {$(
        impl Lane for $t {
            #[inline(always)]
            fn from_f64(v: f64) -> Self {
                <$t>::from_f64(v)
            }
            #[inline(always)]
            fn to_f64(self) -> f64 {
                <$t>::to_f64(self)
            }
            #[inline(always)]
            fn mul(self, rhs: Self) -> Self {
                self * rhs
            }
            #[inline(always)]
            fn add(self, rhs: Self) -> Self {
                self + rhs
            }
        }
    )*};
}

float_lane!(f32, f64);
int_lane!(i32, i16, i8);
half_lane!(f16, bf16);

/// Lanes with a four-wide dot-product path
pub(crate) trait DotLane: Lane {
    type Acc: Lane;

    #[inline(always)]
    fn widen(self) -> Self::Acc {
        self.convert()
    }
}

impl DotLane for i8 {
    type Acc = i32;

    #[inline(always)]
    fn widen(self) -> i32 {
        i32::from(self)
    }
}

impl DotLane for bf16 {
    type Acc = f32;

    #[inline(always)]
    fn widen(self) -> f32 {
        self.to_f32()
    }
}

/// Input and output buffers of one measurement
pub(crate) struct Buffers<S> {
    a: Vec<S>,
    b: Vec<S>,
    c: Vec<S>,
}

impl<S: Lane> Buffers<S> {
    /// Allocate `len` elements per buffer, `None` if the allocator refuses
    pub(crate) fn allocate(len: usize) -> Option<Self> {
        let mut a = Vec::new();
        let mut b = Vec::new();
        let mut c = Vec::new();
        a.try_reserve_exact(len).ok()?;
        b.try_reserve_exact(len).ok()?;
        c.try_reserve_exact(len).ok()?;

        a.extend((0..len).map(S::seed_a));
        b.extend((0..len).map(S::seed_b));
        c.resize(len, S::from_f64(0.0));
        Some(Self { a, b, c })
    }
}

/// Per-lane chained multiply-add over `W`-wide elements
fn fma_chain<S: Lane, A: Lane, const W: usize>(buffers: &mut Buffers<S>, loops: u32) {
    buffers
        .c
        .par_chunks_exact_mut(W)
        .zip(buffers.a.par_chunks_exact(W))
        .zip(buffers.b.par_chunks_exact(W))
        .with_min_len(MIN_TASK_ELEMENTS)
        .for_each(|((c, a), b)| {
            let av: [A; W] = std::array::from_fn(|k| a[k].convert());
            let bv: [A; W] = std::array::from_fn(|k| b[k].convert());
            let mut cv = [A::from_f64(1.0); W];

            for _ in 0..loops {
                for _ in 0..CHAIN {
                    for k in 0..W {
                        cv[k] = av[k].mul(cv[k]).add(bv[k]);
                    }
                }
            }

            for k in 0..W {
                c[k] = cv[k].convert();
            }
        });
    black_box(&buffers.c);
}

/// Four-wide dot product accumulated into `A::Acc`
fn dot_chain<S: Lane, A: DotLane>(buffers: &mut Buffers<S>, loops: u32) {
    buffers
        .c
        .par_chunks_exact_mut(4)
        .zip(buffers.a.par_chunks_exact(4))
        .zip(buffers.b.par_chunks_exact(4))
        .with_min_len(MIN_TASK_ELEMENTS)
        .for_each(|((c, a), b)| {
            let av: [A::Acc; 4] = std::array::from_fn(|k| a[k].convert::<A>().widen());
            let bv: [A::Acc; 4] = std::array::from_fn(|k| b[k].convert::<A>().widen());
            let mut acc = <A::Acc as Lane>::from_f64(1.0);

            for _ in 0..loops {
                for _ in 0..CHAIN {
                    for k in 0..4 {
                        acc = acc.add(av[k].mul(bv[k]));
                    }
                }
            }

            c[0] = acc.convert();
        });
    black_box(&buffers.c);
}

/// A runnable kernel for one (storage, arithmetic, mode) triple
pub(crate) trait Kernel: Send {
    /// Lanes per element
    fn width(&self) -> usize;
    /// Bytes per storage scalar
    fn storage_bytes(&self) -> usize;
    /// Allocate for `elements` elements; `false` if allocation failed
    fn prepare(&mut self, elements: usize) -> bool;
    /// Execute one submission
    fn submit(&mut self, loops: u32);
}

struct FmaKernel<S, A, const W: usize> {
    buffers: Option<Buffers<S>>,
    _arith: std::marker::PhantomData<A>,
}

impl<S: Lane, A: Lane, const W: usize> Kernel for FmaKernel<S, A, W> {
    fn width(&self) -> usize {
        W
    }

    fn storage_bytes(&self) -> usize {
        std::mem::size_of::<S>()
    }

    fn prepare(&mut self, elements: usize) -> bool {
        self.buffers = elements.checked_mul(W).and_then(Buffers::allocate);
        self.buffers.is_some()
    }

    fn submit(&mut self, loops: u32) {
        if let Some(buffers) = self.buffers.as_mut() {
            fma_chain::<S, A, W>(buffers, loops);
        }
    }
}

struct DotKernel<S, A> {
    buffers: Option<Buffers<S>>,
    _arith: std::marker::PhantomData<A>,
}

impl<S: Lane, A: DotLane> Kernel for DotKernel<S, A> {
    fn width(&self) -> usize {
        4
    }

    fn storage_bytes(&self) -> usize {
        std::mem::size_of::<S>()
    }

    fn prepare(&mut self, elements: usize) -> bool {
        self.buffers = elements.checked_mul(4).and_then(Buffers::allocate);
        self.buffers.is_some()
    }

    fn submit(&mut self, loops: u32) {
        if let Some(buffers) = self.buffers.as_mut() {
            dot_chain::<S, A>(buffers, loops);
        }
    }
}

fn fma<S: Lane, A: Lane, const W: usize>() -> Box<dyn Kernel> {
    Box::new(FmaKernel::<S, A, W> {
        buffers: None,
        _arith: std::marker::PhantomData,
    })
}

fn dot<S: Lane, A: DotLane>() -> Box<dyn Kernel> {
    Box::new(DotKernel::<S, A> {
        buffers: None,
        _arith: std::marker::PhantomData,
    })
}

fn with_arithmetic<S: Lane>(
    arithmetic: ArithmeticFormat,
    mode: ParallelMode,
) -> Option<Box<dyn Kernel>> {
    macro_rules! by_width {
        ($a:ty) => {
            match mode {
                ParallelMode::Scalar => Some(fma::<S, $a, 1>()),
                ParallelMode::Vec4 => Some(fma::<S, $a, 4>()),
                ParallelMode::Vec8 => Some(fma::<S, $a, 8>()),
                ParallelMode::DotProduct | ParallelMode::MatrixMultiply => None,
            }
        };
    }

    match (arithmetic, mode) {
        // No matrix unit on the host
        (_, ParallelMode::MatrixMultiply) => None,
        (ArithmeticFormat::Int8, ParallelMode::DotProduct) => Some(dot::<S, i8>()),
        (ArithmeticFormat::Bf16, ParallelMode::DotProduct) => Some(dot::<S, bf16>()),
        (_, ParallelMode::DotProduct) => None,
        (ArithmeticFormat::Fp32, _) => by_width!(f32),
        (ArithmeticFormat::Fp16, _) => by_width!(f16),
        (ArithmeticFormat::Fp64, _) => by_width!(f64),
        (ArithmeticFormat::Int32, _) => by_width!(i32),
        (ArithmeticFormat::Int16, _) => by_width!(i16),
        (ArithmeticFormat::Int8, _) => by_width!(i8),
        (ArithmeticFormat::Bf16, _) => by_width!(bf16),
    }
}

/// Select the kernel for a configuration, `None` if the host cannot run it
pub(crate) fn select(
    storage: StorageFormat,
    arithmetic: ArithmeticFormat,
    mode: ParallelMode,
) -> Option<Box<dyn Kernel>> {
    match storage {
        StorageFormat::Fp32 => with_arithmetic::<f32>(arithmetic, mode),
        StorageFormat::Fp16 | StorageFormat::Fp16Packed => {
            with_arithmetic::<f16>(arithmetic, mode)
        }
        StorageFormat::Fp64 => with_arithmetic::<f64>(arithmetic, mode),
        StorageFormat::Int32 => with_arithmetic::<i32>(arithmetic, mode),
        StorageFormat::Int16 => with_arithmetic::<i16>(arithmetic, mode),
        StorageFormat::Int8 => with_arithmetic::<i8>(arithmetic, mode),
        StorageFormat::Bf16 => with_arithmetic::<bf16>(arithmetic, mode),
    }
}
