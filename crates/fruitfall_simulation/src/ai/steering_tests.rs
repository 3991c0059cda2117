//! Tests for steering (sensor fan, displacement clamp, stuck detection).

#[cfg(test)]
mod tests {
    use bevy::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::f32::consts::{FRAC_PI_2, PI};

    use crate::ai::steering::{rotate_towards, Steering};
    use crate::components::rotate_horizontal;
    use crate::config::{SensorConfig, StuckConfig};
    use crate::world::{Obstacle, ObstacleField, ObstacleMask};

    fn steering() -> Steering {
        Steering::new(
            SensorConfig::default(),
            StuckConfig::default(),
            ObstacleMask::default(),
            Vec3::ZERO,
        )
    }

    const DT: f32 = 1.0 / 60.0;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(7)
    }

    #[test]
    fn test_clear_path_keeps_desired_direction() {
        let field = ObstacleField::default();
        let dir = steering().compute_direction(&field, Vec3::ZERO, Vec3::new(3.0, 1.0, 0.0), &mut rng());
        assert!(dir.abs_diff_eq(Vec3::X, 1e-5), "dir = {:?}", dir);
    }

    #[test]
    fn test_blocked_path_picks_clearer_fan_direction() {
        // Стена поперёк пути на x = 1.5..2.5
        let field = ObstacleField::new(vec![Obstacle::wall(
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(0.5, 2.0, 5.0),
        )]);

        let dir = steering().compute_direction(&field, Vec3::ZERO, Vec3::X, &mut rng());

        assert!((dir.length() - 1.0).abs() < 1e-4);
        assert!(dir.x > 0.0, "should still lean towards the goal: {:?}", dir);
        assert!(dir.z.abs() > 0.5, "should turn away from the wall: {:?}", dir);
        assert_eq!(dir.y, 0.0);
    }

    #[test]
    fn test_wall_ahead_adds_lateral_jitter() {
        // Окружены стенами почти вплотную: все направления упираются
        let field = ObstacleField::new(vec![
            Obstacle::wall(Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.2, 2.0, 2.0)),
            Obstacle::wall(Vec3::new(-1.0, 0.0, 0.0), Vec3::new(0.2, 2.0, 2.0)),
            Obstacle::wall(Vec3::new(0.0, 0.0, 1.0), Vec3::new(2.0, 2.0, 0.2)),
            Obstacle::wall(Vec3::new(0.0, 0.0, -1.0), Vec3::new(2.0, 2.0, 0.2)),
        ]);

        let steering = steering();
        let a = steering.compute_direction(&field, Vec3::ZERO, Vec3::X, &mut rng());
        let b = steering.compute_direction(&field, Vec3::ZERO, Vec3::X, &mut rng());

        // Тот же seed → тот же jitter
        assert!(a.abs_diff_eq(b, 1e-6));
        assert!((a.length() - 1.0).abs() < 1e-4);
        assert_eq!(a.y, 0.0);
    }

    #[test]
    fn test_step_stops_at_obstacle_minus_body_radius() {
        let field = ObstacleField::new(vec![Obstacle::wall(
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(0.5, 2.0, 5.0),
        )]);

        let next = steering().step(&field, Vec3::ZERO, Vec3::X, 5.0);
        assert!((next.x - 1.1).abs() < 1e-4, "next = {:?}", next);

        // Короткий шаг не упирается
        let short = steering().step(&field, Vec3::ZERO, Vec3::X, 0.5);
        assert!((short.x - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_stuck_when_commanded_but_not_moving() {
        let mut steering = steering();

        assert!(!steering.update_stuck(Vec3::ZERO, 4.0, 0.25));
        assert!(!steering.is_stuck());

        assert!(steering.update_stuck(Vec3::new(0.1, 0.0, 0.0), 4.0, 0.25));
        assert!(steering.is_stuck());
    }

    #[test]
    fn test_not_stuck_when_standing_still_on_purpose() {
        let mut steering = steering();
        steering.update_stuck(Vec3::ZERO, 0.0, 0.25);
        steering.update_stuck(Vec3::ZERO, 0.0, 0.25);
        assert!(!steering.is_stuck());
    }

    #[test]
    fn test_not_stuck_after_halting_inside_window() {
        let mut steering = steering();
        // Один тик бежим, дальше стоим (дошли до stop_distance)
        steering.update_stuck(Vec3::new(0.05, 0.0, 0.0), 4.0, DT);
        for _ in 0..40 {
            steering.update_stuck(Vec3::new(0.05, 0.0, 0.0), 0.0, DT);
        }
        assert!(!steering.is_stuck());
    }

    #[test]
    fn test_not_stuck_when_resuming_on_sample_tick() {
        let mut steering = steering();
        steering.update_stuck(Vec3::ZERO, 0.0, 0.25);
        // Цель отошла: снова скомандовали движение ровно на тике сэмпла
        assert!(steering.update_stuck(Vec3::new(0.05, 0.0, 0.0), 4.0, 0.25));
        assert!(!steering.is_stuck());
        assert_eq!(steering.stuck_state().last_commanded_speed, 4.0);
    }

    #[test]
    fn test_not_stuck_when_displacing() {
        let mut steering = steering();
        steering.update_stuck(Vec3::new(0.5, 0.0, 0.0), 2.0, 0.25);
        steering.update_stuck(Vec3::new(1.0, 0.0, 0.0), 2.0, 0.25);
        assert!(!steering.is_stuck());
    }

    #[test]
    fn test_stuck_clears_on_next_good_sample() {
        let mut steering = steering();
        steering.update_stuck(Vec3::ZERO, 4.0, 0.5);
        assert!(steering.is_stuck());

        steering.update_stuck(Vec3::new(2.0, 0.0, 0.0), 4.0, 0.5);
        assert!(!steering.is_stuck());
    }

    #[test]
    fn test_reset_stuck_starts_new_window() {
        let mut steering = steering();
        steering.update_stuck(Vec3::ZERO, 4.0, 0.5);
        assert!(steering.is_stuck());

        steering.reset_stuck(Vec3::new(3.0, 0.0, 0.0));
        assert!(!steering.is_stuck());
        assert_eq!(steering.stuck_state().last_position, Vec3::new(3.0, 0.0, 0.0));
        assert_eq!(steering.stuck_state().check_timer, 0.0);
    }

    #[test]
    fn test_reroute_heading_prefers_open_side() {
        // Стена со стороны -Z: положительные смещения (поворот к -Z) заблокированы
        let field = ObstacleField::new(vec![Obstacle::wall(
            Vec3::new(0.0, 0.0, -1.5),
            Vec3::new(6.0, 2.0, 0.5),
        )]);

        let heading = steering().reroute_heading(&field, Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0), Vec3::NEG_Z);

        let expected = rotate_horizontal(Vec3::X, (-30.0f32).to_radians());
        assert!(heading.z > 0.0, "heading = {:?}", heading);
        assert!(heading.abs_diff_eq(expected, 1e-4), "heading = {:?}", heading);
    }

    #[test]
    fn test_rotation_is_rate_limited_and_horizontal() {
        // yaw 0 смотрит в -Z, цель сзади (+Z)
        let yaw = rotate_towards(0.0, Vec3::new(0.0, 3.0, 1.0), FRAC_PI_2, 1.0);
        assert!((yaw.abs() - FRAC_PI_2).abs() < 1e-4, "yaw = {}", yaw);

        // Второй шаг доводит до цели (±π)
        let yaw = rotate_towards(yaw, Vec3::Z, FRAC_PI_2, 1.0);
        assert!((yaw.abs() - PI).abs() < 1e-4, "yaw = {}", yaw);
    }

    #[test]
    fn test_zero_direction_keeps_yaw() {
        assert_eq!(rotate_towards(0.7, Vec3::ZERO, 10.0, 1.0), 0.7);
        assert_eq!(rotate_towards(0.7, Vec3::Y, 10.0, 1.0), 0.7);
    }
}
