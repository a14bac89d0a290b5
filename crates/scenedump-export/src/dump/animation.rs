//! Animation block serializer

use std::io::{self, Write};

use scenedump_core::{Animation, BoneAnim};

use super::format::Components;

/// Write one `Animation` block with all of its bone channels.
///
/// Keys are emitted exactly as stored: all rotation keys, then all scaling
/// keys, then all position keys, per channel.
pub fn write_animation<W: Write>(w: &mut W, anim: &Animation) -> io::Result<()> {
    writeln!(w, "Animation")?;
    writeln!(w, "\tName: {}", anim.name)?;
    writeln!(w, "\tDuration: {:?}", anim.duration)?;
    writeln!(w, "\tTicks/s: {:?}", anim.ticks_per_second)?;
    writeln!(w, "\tNum BoneAnim channels: {}", anim.channels.len())?;
    writeln!(w)?;

    for channel in &anim.channels {
        write_channel(w, channel)?;
    }
    Ok(())
}

fn write_channel<W: Write>(w: &mut W, channel: &BoneAnim) -> io::Result<()> {
    writeln!(w, "\tBoneAnim")?;
    writeln!(w, "\tName: {}", channel.bone)?;

    writeln!(w, "\tNum QuatKeys: {}", channel.rotation_keys.len())?;
    for key in &channel.rotation_keys {
        write_key(w, "QuatKey", key.time, &key.value.to_array())?;
    }

    writeln!(w, "\tNum SclKeys: {}", channel.scaling_keys.len())?;
    for key in &channel.scaling_keys {
        write_key(w, "SclKey", key.time, &key.value.to_array())?;
    }

    writeln!(w, "\tNum PosKeys: {}", channel.position_keys.len())?;
    for key in &channel.position_keys {
        write_key(w, "PosKey", key.time, &key.value.to_array())?;
    }

    writeln!(w)
}

fn write_key<W: Write>(w: &mut W, label: &str, time: f64, value: &[f32]) -> io::Result<()> {
    writeln!(w, "\t\t{label}: ")?;
    writeln!(w, "\t\t\tTicks: {time:?}")?;
    writeln!(w, "\t\t\tValue: ({})", Components(value))
}
