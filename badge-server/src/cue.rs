//! Audible feedback for registration results

use std::time::Duration;

use tracing::warn;

/// Tone frequency for both cues
pub const CUE_FREQUENCY_HZ: u32 = 1500;

/// Cue length for an accepted registration
pub const ACCEPTED_CUE: Duration = Duration::from_millis(200);

/// Cue length for a rejected registration
pub const REJECTED_CUE: Duration = Duration::from_millis(800);

/// Something that can make a tone
pub trait AudibleCue: Send {
    /// Play a tone; blocks for about `length`
    fn beep(&mut self, frequency_hz: u32, length: Duration);
}

/// Host speaker
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemCue;

#[cfg(target_os = "linux")]
impl AudibleCue for SystemCue {
    fn beep(&mut self, frequency_hz: u32, length: Duration) {
        let status = std::process::Command::new("beep")
            .arg("-f")
            .arg(frequency_hz.to_string())
            .arg("-l")
            .arg(length.as_millis().to_string())
            .status();
        match status {
            Ok(status) if status.success() => {}
            Ok(status) => warn!("beep exited with {}", status),
            Err(e) => warn!("Could not run beep: {}", e),
        }
    }
}

#[cfg(windows)]
impl AudibleCue for SystemCue {
    fn beep(&mut self, frequency_hz: u32, length: Duration) {
        let millis = u32::try_from(length.as_millis()).unwrap_or(u32::MAX);
        // SAFETY: Beep takes plain integers and has no memory preconditions
        let ok = unsafe { windows_sys::Win32::System::Diagnostics::Debug::Beep(frequency_hz, millis) };
        if ok == 0 {
            warn!("Beep failed: {}", std::io::Error::last_os_error());
        }
    }
}

#[cfg(not(any(target_os = "linux", windows)))]
impl AudibleCue for SystemCue {
    fn beep(&mut self, _frequency_hz: u32, length: Duration) {
        use std::io::Write;

        let mut stdout = std::io::stdout();
        if let Err(e) = stdout.write_all(b"\x07").and_then(|_| stdout.flush()) {
            warn!("Could not ring terminal bell: {}", e);
        }
        std::thread::sleep(length);
    }
}
