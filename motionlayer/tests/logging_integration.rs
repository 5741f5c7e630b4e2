//! Integration test for the logging setup.
//!
//! The global subscriber can only be installed once per process, so this
//! file holds a single test.

use std::time::Duration;

use motionlayer::config::ConfigFile;
use motionlayer::logging::init_logging;
use motionlayer::profile::DeviceProfile;
use motionlayer::MotionController;

#[test]
fn transitions_are_written_to_the_log_file() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let log_dir = temp_dir.path().join("logs");
    std::fs::create_dir_all(&log_dir).unwrap();
    std::fs::write(log_dir.join("motion.log"), "stale").unwrap();

    let guard = init_logging(&log_dir, "motion.log", false, false).unwrap();

    let controller = MotionController::from_profile(DeviceProfile::default(), &ConfigFile::default());
    controller.observe_fps(12.0);

    // A second subscriber cannot be installed.
    assert!(init_logging(&log_dir, "other.log", false, false).is_err());

    drop(guard);
    std::thread::sleep(Duration::from_millis(50));

    let contents = std::fs::read_to_string(log_dir.join("motion.log")).unwrap();
    assert!(!contents.contains("stale"));
    assert!(contents.contains("Initial tier classified"));
    assert!(contents.contains("Tier changed by frame rate"));
}
