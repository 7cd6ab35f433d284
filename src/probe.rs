//! # Probe Object Loading and Attachment
//!
//! Loads a precompiled BPF object from disk and attaches its programs to
//! kernel hook points. The object is an external artifact; its program and
//! map identifiers are matched by exact name, so they are part of the
//! contract with the probe toolchain.

use std::path::Path;

use anyhow::{Context, Result};
use aya::maps::{MapData, RingBuf};
use aya::programs::kprobe::KProbeLinkId;
use aya::programs::uprobe::UProbeLinkId;
use aya::programs::{KProbe, UProbe};
use aya::Ebpf;
use log::{info, warn};

use crate::domain::ProbeError;

/// Program name the goroutine-state probe object must expose.
pub const STATE_PROGRAM: &str = "uprobe_runtime_casgstatus";
/// Ring buffer map name the goroutine-state probe object must expose.
pub const EVENT_MAP: &str = "rb";

enum AttachedProbe {
    Uprobe { program: String, link: UProbeLinkId },
    Kprobe { program: String, link: KProbeLinkId },
}

/// Owns the loaded BPF object and any live attachments.
///
/// Attachments install kernel-side probes for the process lifetime and are
/// released explicitly via [`ProbeManager::detach`] on shutdown (dropping
/// the manager releases them too).
pub struct ProbeManager {
    bpf: Ebpf,
    attached: Vec<AttachedProbe>,
}

impl ProbeManager {
    /// Load a compiled BPF object from `object_path`.
    ///
    /// # Errors
    /// Fails if the file is missing or is not a loadable BPF object.
    pub fn load(object_path: &Path) -> Result<Self> {
        let bpf = Ebpf::load_file(object_path).map_err(|e| ProbeError::ObjectLoadFailed {
            path: object_path.display().to_string(),
            error: e.to_string(),
        })?;
        Ok(Self { bpf, attached: Vec::new() })
    }

    /// Attach `program` as a uprobe on `symbol` inside `target` binary,
    /// optionally scoped to a single PID (`None` = all processes using the
    /// binary).
    ///
    /// # Errors
    /// Fails if the program is absent from the object, the binary cannot be
    /// opened, or the kernel rejects the attachment (privilege, missing
    /// symbol).
    pub fn attach_uprobe(
        &mut self,
        program: &str,
        target: &str,
        symbol: &str,
        pid: Option<i32>,
    ) -> Result<()> {
        let uprobe: &mut UProbe = self
            .bpf
            .program_mut(program)
            .ok_or_else(|| ProbeError::ProgramNotFound(program.to_string()))?
            .try_into()
            .map_err(ProbeError::Program)?;
        uprobe.load().map_err(ProbeError::Program)?;
        let link = uprobe.attach(Some(symbol), 0, target, pid).map_err(|e| {
            ProbeError::AttachFailed {
                probe: program.to_string(),
                target: format!("{symbol} in {target}"),
                error: e.to_string(),
            }
        })?;
        self.attached.push(AttachedProbe::Uprobe { program: program.to_string(), link });
        info!("Attached uprobe {program}: {symbol} -> {target}");
        Ok(())
    }

    /// Attach `program` as a kprobe on kernel function `fn_name`.
    ///
    /// # Errors
    /// Fails if the program is absent or the kernel rejects the attachment.
    pub fn attach_kprobe(&mut self, program: &str, fn_name: &str) -> Result<()> {
        let kprobe: &mut KProbe = self
            .bpf
            .program_mut(program)
            .ok_or_else(|| ProbeError::ProgramNotFound(program.to_string()))?
            .try_into()
            .map_err(ProbeError::Program)?;
        kprobe.load().map_err(ProbeError::Program)?;
        let link = kprobe.attach(fn_name, 0).map_err(|e| ProbeError::AttachFailed {
            probe: program.to_string(),
            target: fn_name.to_string(),
            error: e.to_string(),
        })?;
        self.attached.push(AttachedProbe::Kprobe { program: program.to_string(), link });
        info!("Attached kprobe {program}: {fn_name}");
        Ok(())
    }

    /// Take ownership of the named ring buffer map.
    ///
    /// # Errors
    /// Fails if the map is absent from the object or is not a ring buffer.
    pub fn take_ring_buf(&mut self, name: &str) -> Result<RingBuf<MapData>> {
        let map = self
            .bpf
            .take_map(name)
            .ok_or_else(|| ProbeError::MapNotFound(name.to_string()))?;
        RingBuf::try_from(map)
            .map_err(ProbeError::Map)
            .with_context(|| format!("map {name} is not a ring buffer"))
    }

    /// Release every live attachment, newest first.
    pub fn detach(&mut self) {
        while let Some(probe) = self.attached.pop() {
            let result = match probe {
                AttachedProbe::Uprobe { ref program, link } => self
                    .bpf
                    .program_mut(program)
                    .and_then(|p| <&mut UProbe>::try_from(p).ok())
                    .map(|p| p.detach(link)),
                AttachedProbe::Kprobe { ref program, link } => self
                    .bpf
                    .program_mut(program)
                    .and_then(|p| <&mut KProbe>::try_from(p).ok())
                    .map(|p| p.detach(link)),
            };
            match result {
                Some(Ok(())) | None => {}
                Some(Err(e)) => warn!("failed to detach probe: {e}"),
            }
        }
    }
}
