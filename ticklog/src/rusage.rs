//! Process resource usage sampling (unix only).
//!
//! Samples `getrusage(RUSAGE_SELF)` and maps each counter onto one of the
//! reserved `SERIES_RU_*` series, so resource usage can be logged alongside
//! application samples and told apart by series id.

use std::io;

use crate::record::{
    Record, SERIES_RU_IDRSS, SERIES_RU_INBLOCK, SERIES_RU_ISRSS, SERIES_RU_IXRSS,
    SERIES_RU_MAJFLT, SERIES_RU_MAXRSS, SERIES_RU_MINFLT, SERIES_RU_MSGRCV, SERIES_RU_MSGSND,
    SERIES_RU_NIVCSW, SERIES_RU_NSIGNALS, SERIES_RU_NSWAP, SERIES_RU_NVCSW, SERIES_RU_OUBLOCK,
    SERIES_RU_STIME, SERIES_RU_UTIME,
};

/// Number of series produced by one sample.
pub const RUSAGE_SERIES: usize = 16;

/// A snapshot of the process's resource counters.
///
/// CPU times are in microseconds; the remaining fields are reported in the
/// units the OS uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceUsage {
    /// User CPU time in microseconds.
    pub utime_us: u64,
    /// System CPU time in microseconds.
    pub stime_us: u64,
    /// Maximum resident set size.
    pub maxrss: u64,
    /// Integral shared memory size.
    pub ixrss: u64,
    /// Integral unshared data size.
    pub idrss: u64,
    /// Integral unshared stack size.
    pub isrss: u64,
    /// Minor page faults.
    pub minflt: u64,
    /// Major page faults.
    pub majflt: u64,
    /// Swaps.
    pub nswap: u64,
    /// Block input operations.
    pub inblock: u64,
    /// Block output operations.
    pub oublock: u64,
    /// IPC messages sent.
    pub msgsnd: u64,
    /// IPC messages received.
    pub msgrcv: u64,
    /// Signals received.
    pub nsignals: u64,
    /// Voluntary context switches.
    pub nvcsw: u64,
    /// Involuntary context switches.
    pub nivcsw: u64,
}

impl ResourceUsage {
    /// Samples the calling process.
    ///
    /// # Errors
    ///
    /// Returns the OS error if `getrusage` fails.
    pub fn sample() -> io::Result<Self> {
        // SAFETY: `rusage` is a plain C struct of integers, for which the
        // all-zero bit pattern is a valid value.
        let mut usage: libc::rusage = unsafe { std::mem::zeroed() };

        // SAFETY: `usage` is a valid, writable `rusage` that outlives the call.
        let rc = unsafe { libc::getrusage(libc::RUSAGE_SELF, &raw mut usage) };
        if rc != 0 {
            return Err(io::Error::last_os_error());
        }

        Ok(Self::from_raw(&usage))
    }

    fn from_raw(usage: &libc::rusage) -> Self {
        Self {
            utime_us: timeval_micros(usage.ru_utime),
            stime_us: timeval_micros(usage.ru_stime),
            maxrss: non_negative(usage.ru_maxrss),
            ixrss: non_negative(usage.ru_ixrss),
            idrss: non_negative(usage.ru_idrss),
            isrss: non_negative(usage.ru_isrss),
            minflt: non_negative(usage.ru_minflt),
            majflt: non_negative(usage.ru_majflt),
            nswap: non_negative(usage.ru_nswap),
            inblock: non_negative(usage.ru_inblock),
            oublock: non_negative(usage.ru_oublock),
            msgsnd: non_negative(usage.ru_msgsnd),
            msgrcv: non_negative(usage.ru_msgrcv),
            nsignals: non_negative(usage.ru_nsignals),
            nvcsw: non_negative(usage.ru_nvcsw),
            nivcsw: non_negative(usage.ru_nivcsw),
        }
    }

    /// Expands the snapshot into one record per reserved series, stamped `when`.
    pub fn records(&self, when: u64) -> [Record; RUSAGE_SERIES] {
        [
            Record::new(SERIES_RU_UTIME, when, self.utime_us),
            Record::new(SERIES_RU_STIME, when, self.stime_us),
            Record::new(SERIES_RU_MAXRSS, when, self.maxrss),
            Record::new(SERIES_RU_IXRSS, when, self.ixrss),
            Record::new(SERIES_RU_IDRSS, when, self.idrss),
            Record::new(SERIES_RU_ISRSS, when, self.isrss),
            Record::new(SERIES_RU_MINFLT, when, self.minflt),
            Record::new(SERIES_RU_MAJFLT, when, self.majflt),
            Record::new(SERIES_RU_NSWAP, when, self.nswap),
            Record::new(SERIES_RU_INBLOCK, when, self.inblock),
            Record::new(SERIES_RU_OUBLOCK, when, self.oublock),
            Record::new(SERIES_RU_MSGSND, when, self.msgsnd),
            Record::new(SERIES_RU_MSGRCV, when, self.msgrcv),
            Record::new(SERIES_RU_NSIGNALS, when, self.nsignals),
            Record::new(SERIES_RU_NVCSW, when, self.nvcsw),
            Record::new(SERIES_RU_NIVCSW, when, self.nivcsw),
        ]
    }
}

fn timeval_micros(tv: libc::timeval) -> u64 {
    non_negative(tv.tv_sec)
        .saturating_mul(1_000_000)
        .saturating_add(non_negative(tv.tv_usec))
}

fn non_negative<T: TryInto<u64>>(value: T) -> u64 {
    value.try_into().unwrap_or(0)
}
