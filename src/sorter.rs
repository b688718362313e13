//! The orchestrator. A sort is a fixed sequence of passes, one per digit group from the least
//! significant up; each pass is a histogram, a scan of it and a scatter, and reads the
//! buffer the previous pass wrote.
//!
//! Two equally sized buffers, A and B, swap source and destination roles after every pass.
//! The input starts in A, so after the last pass the result sits in B when the pass count is
//! odd and in A when it is even. Nothing is copied back.

use crate::device::Device;
use crate::error::{Result, SortError};
use crate::primitives::{bucket_sort, HistogramTable, PrefixOffsetTable};
use crate::sort_config::SortConfig;
use crate::sort_key::{DigitGroup, SortKey};
use crate::tuner::{Tuner, TuningParams};
use crate::utils::cdiv;
use log::{debug, info, trace};

pub const MAX_DIGIT_BITS: u32 = 16;

/// A pass keeps one counter and one destination range per digit value and group. That table
/// may hold `max(MIN_GROUP_TABLE_LIMIT, 4 * len)` entries; wider digits are rejected.
pub const MIN_GROUP_TABLE_LIMIT: usize = 1 << 20;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum BufferId {
    A,
    B,
}

impl BufferId {
    #[inline]
    fn other(self) -> Self {
        match self {
            BufferId::A => BufferId::B,
            BufferId::B => BufferId::A,
        }
    }
}

/// Digit width and pass count of one sort, fixed before the first pass.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct SortPlan {
    pub key_bits: u32,
    pub digit_bits: u32,
    pub passes: usize,
}

impl SortPlan {
    pub fn new(key_bits: u32, digit_bits: u32) -> Result<Self> {
        if digit_bits == 0 || digit_bits > MAX_DIGIT_BITS || digit_bits > key_bits {
            return Err(SortError::UnsupportedDigitWidth {
                digit_bits,
                key_bits,
            });
        }

        Ok(Self {
            key_bits,
            digit_bits,
            passes: cdiv(key_bits as usize, digit_bits as usize),
        })
    }

    /// The digit group consumed by `pass`. The last one is narrowed to the bits left below
    /// `key_bits`, so bits above it never influence the order.
    pub fn digit(&self, pass: usize) -> DigitGroup {
        let shift = pass as u32 * self.digit_bits;
        let bits = self.digit_bits.min(self.key_bits - shift);

        DigitGroup::new(shift, bits)
    }

    /// The buffer holding the result once every pass has run.
    pub fn result_buffer(&self) -> BufferId {
        if self.passes % 2 == 1 {
            BufferId::B
        } else {
            BufferId::A
        }
    }
}

/// The tables of one pass, kept when pass reports are enabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassReport {
    pub pass: usize,
    pub shift: u32,
    pub histogram: HistogramTable,
    pub offsets: PrefixOffsetTable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOutcome {
    /// The buffer that holds the sorted keys (and payload).
    pub buffer: BufferId,
    pub len: usize,
    pub plan: SortPlan,
    pub passes: Vec<PassReport>,
}

impl SortOutcome {
    /// Picks the sorted sequence out of the two buffers the sort ran on.
    pub fn result<'b, T>(&self, a: &'b [T], b: &'b [T]) -> &'b [T] {
        match self.buffer {
            BufferId::A => &a[..self.len],
            BufferId::B => &b[..self.len],
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
enum SortState {
    Idle,
    Running { pass: usize },
    Done,
}

/// Two buffers of equal length and which of them the next pass reads.
struct PingPong<'a, T> {
    a: &'a mut [T],
    b: &'a mut [T],
    source: BufferId,
}

impl<'a, T> PingPong<'a, T> {
    fn new(a: &'a mut [T], b: &'a mut [T]) -> Self {
        debug_assert_eq!(a.len(), b.len());

        Self {
            a,
            b,
            source: BufferId::A,
        }
    }

    #[inline]
    fn split(&mut self) -> (&[T], &mut [T]) {
        match self.source {
            BufferId::A => (&*self.a, &mut *self.b),
            BufferId::B => (&*self.b, &mut *self.a),
        }
    }

    #[inline]
    fn swap(&mut self) {
        self.source = self.source.other();
    }
}

pub struct RadixSorter {
    device: Device,
    tuner: Box<dyn Tuner + Send + Sync>,
    key_bits: Option<u32>,
    pass_reports: bool,
}

impl RadixSorter {
    /// Validates `config` and sets up the device. The cooperative-group backend is fixed here
    /// for the lifetime of the sorter.
    pub fn new(config: SortConfig) -> Result<Self> {
        config.validate()?;

        let device = Device::new(
            config.backend,
            config.workgroup_size,
            config.subgroup_size,
            config.multi_threaded,
        );

        info!(
            "radix sorter: {:?} backend (requested {:?}), workgroup {}, subgroup {}, multi-threaded {}",
            device.group().backend(),
            config.backend,
            config.workgroup_size,
            config.subgroup_size,
            config.multi_threaded
        );

        Ok(Self {
            device,
            tuner: config.tuner,
            key_bits: config.key_bits,
            pass_reports: config.pass_reports,
        })
    }

    /// The device the primitives run on, for calling them directly.
    #[inline]
    pub fn device(&self) -> &Device {
        &self.device
    }

    fn plan<K: SortKey>(&self, len: usize) -> Result<SortPlan> {
        if len > u32::MAX as usize {
            return Err(SortError::TooManyElements(len));
        }

        let key_bits = self.key_bits.unwrap_or(K::BITS);
        if key_bits == 0 || key_bits > K::BITS {
            return Err(SortError::UnsupportedKeyWidth {
                key_bits,
                max: K::BITS,
            });
        }

        let digit_bits = self.tuner.pick_digit_bits(&TuningParams {
            input_len: len,
            key_bits,
        });

        let plan = SortPlan::new(key_bits, digit_bits)?;
        self.check_group_table(len, plan.digit_bits)?;

        Ok(plan)
    }

    fn check_group_table(&self, len: usize, digit_bits: u32) -> Result<()> {
        let groups = self.device.group_count(len);
        let limit = len.saturating_mul(4).max(MIN_GROUP_TABLE_LIMIT);

        if groups.saturating_mul(1 << digit_bits) > limit {
            return Err(SortError::GroupTableTooLarge {
                digit_bits,
                groups,
                limit,
            });
        }

        Ok(())
    }

    /// Sorts `keys`, using `scratch` as the second buffer. `scratch` must hold at least as many
    /// elements as `keys`; only its first `keys.len()` slots are used.
    ///
    /// The returned outcome says whether the sorted keys are in `keys` (A) or `scratch` (B).
    pub fn sort_keys<K: SortKey>(&self, keys: &mut [K], scratch: &mut [K]) -> Result<SortOutcome> {
        let n = keys.len();
        check_capacity(n, scratch.len())?;

        self.run::<K, ()>(keys, &mut scratch[..n], None)
    }

    /// Sorts `keys` and moves `payload` along with them. Equal keys keep their input order.
    pub fn sort_pairs<K, V>(
        &self,
        keys: &mut [K],
        scratch_keys: &mut [K],
        payload: &mut [V],
        scratch_payload: &mut [V],
    ) -> Result<SortOutcome>
    where
        K: SortKey,
        V: Copy + Send + Sync,
    {
        let n = keys.len();
        if payload.len() != n {
            return Err(SortError::LengthMismatch {
                keys: n,
                payload: payload.len(),
            });
        }

        check_capacity(n, scratch_keys.len())?;
        check_capacity(n, scratch_payload.len())?;

        self.run(
            keys,
            &mut scratch_keys[..n],
            Some((payload, &mut scratch_payload[..n])),
        )
    }

    /// One stable pass over the low `digit_bits` bits of every key, from `keys` into
    /// `out_keys`.
    pub fn bucket_sort<K, V>(
        &self,
        keys: &[K],
        out_keys: &mut [K],
        payload: Option<(&[V], &mut [V])>,
        digit_bits: u32,
    ) -> Result<(HistogramTable, PrefixOffsetTable)>
    where
        K: SortKey,
        V: Copy + Send + Sync,
    {
        let n = keys.len();
        if n > u32::MAX as usize {
            return Err(SortError::TooManyElements(n));
        }

        let plan = SortPlan::new(K::BITS, digit_bits)?;
        self.check_group_table(n, digit_bits)?;
        check_capacity(n, out_keys.len())?;

        let payload = match payload {
            Some((values, out_values)) => {
                if values.len() != n {
                    return Err(SortError::LengthMismatch {
                        keys: n,
                        payload: values.len(),
                    });
                }
                check_capacity(n, out_values.len())?;

                Some((values, &mut out_values[..n]))
            }
            None => None,
        };

        Ok(bucket_sort(
            &self.device,
            keys,
            &mut out_keys[..n],
            payload,
            plan.digit(0),
        ))
    }

    fn run<K, V>(
        &self,
        a: &mut [K],
        b: &mut [K],
        payload: Option<(&mut [V], &mut [V])>,
    ) -> Result<SortOutcome>
    where
        K: SortKey,
        V: Copy + Send + Sync,
    {
        let n = a.len();
        let plan = self.plan::<K>(n)?;
        let mut state = SortState::Idle;

        debug!(
            "sort: {} keys, {} key bits, {}-bit digits, {} passes",
            n, plan.key_bits, plan.digit_bits, plan.passes
        );

        if n == 0 {
            return Ok(SortOutcome {
                buffer: BufferId::A,
                len: 0,
                plan,
                passes: Vec::new(),
            });
        }

        let mut keys = PingPong::new(a, b);
        let mut values = payload.map(|(pa, pb)| PingPong::new(pa, pb));
        let mut reports = Vec::new();

        for pass in 0..plan.passes {
            debug_assert!(match state {
                SortState::Idle => pass == 0,
                SortState::Running { pass: previous } => previous + 1 == pass,
                SortState::Done => false,
            });
            state = SortState::Running { pass };
            trace!("{:?}", state);

            let digit = plan.digit(pass);
            let (src, dst) = keys.split();
            let pass_payload = values.as_mut().map(|v| v.split());

            let (histogram, offsets) = bucket_sort(&self.device, src, dst, pass_payload, digit);

            debug!(
                "pass {}: shift {}, {} of {} buckets used",
                pass,
                digit.shift,
                histogram.as_slice().iter().filter(|c| **c > 0).count(),
                histogram.radix()
            );

            keys.swap();
            if let Some(v) = values.as_mut() {
                v.swap();
            }

            if self.pass_reports {
                reports.push(PassReport {
                    pass,
                    shift: digit.shift,
                    histogram,
                    offsets,
                });
            }
        }

        debug_assert_eq!(keys.source, plan.result_buffer());
        state = SortState::Done;
        trace!("{:?}: result in {:?}", state, keys.source);

        Ok(SortOutcome {
            buffer: keys.source,
            len: n,
            plan,
            passes: reports,
        })
    }
}

#[inline]
fn check_capacity(len: usize, scratch: usize) -> Result<()> {
    if scratch < len {
        return Err(SortError::InsufficientCapacity {
            required: len * 2,
            available: len + scratch,
        });
    }

    Ok(())
}
