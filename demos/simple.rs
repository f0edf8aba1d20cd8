use ds_engine::*;

use std::thread;
use std::time::Duration;

fn main() {
    tracing_subscriber::fmt::init();

    let ds = DriverStation::new_team(4069, Alliance::new_red(1));
    ds.set_log_consumer(|packet| {
        if let TcpPacket::Stdout(stdout) = packet {
            println!("[{:.3}] {}", stdout.timestamp, stdout.message);
        }
    });

    ds.joysticks().attach(0).expect("port 0 exists");
    ds.set_mode(Mode::Teleoperated);

    thread::sleep(Duration::from_millis(1500));
    ds.restart_code();
    loop {
        println!(
            "Connected: {}, code: {}, battery: {:.2}V",
            ds.connected(),
            ds.trace().is_code_started(),
            ds.battery_voltage()
        );

        thread::sleep(Duration::from_millis(500));
    }
}
