//! Optional real-time thread setup.
//!
//! With the `rt` feature: lock memory pages, prefault the stack, pin the
//! loop thread to a CPU core and switch to SCHED_FIFO. Without it every call
//! is a no-op, which is what the simulation host wants.

use thiserror::Error;

/// Errors during RT setup.
#[derive(Debug, Error)]
pub enum RtSetupError {
    /// An RT system call failed.
    #[error("RT setup error: {0}")]
    Setup(String),
}

/// Apply the full RT setup sequence to the calling thread.
///
/// Must run before entering the cycle loop.
#[cfg(feature = "rt")]
pub fn configure_rt_thread(cpu_core: usize, priority: i32) -> Result<(), RtSetupError> {
    use nix::sched::{sched_setaffinity, CpuSet};
    use nix::sys::mman::{mlockall, MlockallFlags};
    use nix::unistd::Pid;

    // 1. Lock all current and future pages (no page faults in the loop).
    mlockall(MlockallFlags::MCL_CURRENT | MlockallFlags::MCL_FUTURE)
        .map_err(|e| RtSetupError::Setup(format!("mlockall failed: {e}")))?;

    // 2. Prefault stack pages.
    prefault_stack();

    // 3. Pin to the configured core.
    let mut cpuset = CpuSet::new();
    cpuset
        .set(cpu_core)
        .map_err(|e| RtSetupError::Setup(format!("CpuSet::set({cpu_core}) failed: {e}")))?;
    sched_setaffinity(Pid::from_raw(0), &cpuset)
        .map_err(|e| RtSetupError::Setup(format!("sched_setaffinity failed: {e}")))?;

    // 4. SCHED_FIFO with the configured priority.
    let param = libc::sched_param {
        sched_priority: priority,
    };
    let ret = unsafe { libc::sched_setscheduler(0, libc::SCHED_FIFO, &param) };
    if ret != 0 {
        let err = std::io::Error::last_os_error();
        return Err(RtSetupError::Setup(format!(
            "sched_setscheduler(SCHED_FIFO, {priority}) failed: {err}"
        )));
    }

    Ok(())
}

/// Touch a large stack allocation to force page allocation up front.
#[cfg(feature = "rt")]
fn prefault_stack() {
    let mut buf = [0u8; 256 * 1024];
    for byte in buf.iter_mut() {
        unsafe { core::ptr::write_volatile(byte, 0xFF) };
    }
    core::hint::black_box(&buf);
}

#[cfg(not(feature = "rt"))]
pub fn configure_rt_thread(_cpu_core: usize, _priority: i32) -> Result<(), RtSetupError> {
    Ok(()) // No-op in simulation mode
}
