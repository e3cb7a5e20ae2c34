use crate::config::UniverseSettings;
use crate::state::{Double3D, PlayerData};
use tracing::instrument;

fn clamp_axis(position: f64, velocity: f64, dim: u32) -> (f64, f64) {
    let max = dim as f64;
    if position < 0.0 {
        (0.0, 0.0)
    } else if position > max {
        (max, 0.0)
    } else {
        (position, velocity)
    }
}

/// Advance position by one turn of velocity.
///
/// The universe is a closed box. Hitting a wall stops motion along that
/// axis; the fuel spent on it is lost.
#[instrument(skip_all, name = "movement")]
pub fn run_movement(player: &mut PlayerData, settings: &UniverseSettings) {
    if player.velocity == Double3D::ZERO {
        return;
    }
    let moved = player.position.add(&player.velocity);
    let (x, vx) = clamp_axis(moved.x, player.velocity.x, settings.x_dim);
    let (y, vy) = clamp_axis(moved.y, player.velocity.y, settings.y_dim);
    let (z, vz) = clamp_axis(moved.z, player.velocity.z, settings.z_dim);

    let velocity = Double3D::new(vx, vy, vz);
    if velocity != player.velocity {
        log::debug!("Player {} hit the universe boundary", player.player_id);
    }
    log::trace!(
        "Player {} moved {:?} -> ({}, {}, {})",
        player.player_id,
        player.position,
        x,
        y,
        z
    );
    player.position = Double3D::new(x, y, z);
    player.velocity = velocity;
}
