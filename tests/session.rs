//! Runs a driver station against a fake roboRIO on localhost

use ds_engine::*;

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

fn eventually(timeout: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(10));
    }
    cond()
}

fn free_udp_port() -> u16 {
    UdpSocket::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

struct FakeRio {
    control: UdpSocket,
    log: TcpListener,
    status_port: u16,
    streaming: Arc<AtomicBool>,
}

impl FakeRio {
    fn new() -> FakeRio {
        let control = UdpSocket::bind("127.0.0.1:0").unwrap();
        control
            .set_read_timeout(Some(Duration::from_secs(2)))
            .unwrap();
        FakeRio {
            control,
            log: TcpListener::bind("127.0.0.1:0").unwrap(),
            status_port: free_udp_port(),
            streaming: Arc::new(AtomicBool::new(true)),
        }
    }

    fn config(&self) -> DsConfig {
        DsConfig::default()
            .with_ports(
                self.control.local_addr().unwrap().port(),
                self.status_port,
                self.log.local_addr().unwrap().port(),
            )
            .with_sim_port(None)
            .with_tick(Duration::from_millis(10))
    }

    /// Sends a status packet every 20ms: teleop enabled, robot code up, 12.5V
    fn stream_status(&self) {
        let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
        let port = self.status_port;
        let streaming = self.streaming.clone();
        thread::spawn(move || {
            let mut seqnum = 0u16;
            while streaming.load(Ordering::SeqCst) {
                let [hi, lo] = seqnum.to_be_bytes();
                let packet = [hi, lo, 0x01, 0x04, 0x32, 0x0c, 0x80, 0x00];
                let _ = socket.send_to(&packet, ("127.0.0.1", port));
                seqnum = seqnum.wrapping_add(1);
                thread::sleep(Duration::from_millis(20));
            }
        });
    }

    fn next_control(&self) -> Vec<u8> {
        let mut buf = [0u8; 512];
        let n = self.control.recv(&mut buf).unwrap();
        buf[..n].to_vec()
    }

    fn accept_log(&self) -> TcpStream {
        self.log.set_nonblocking(true).unwrap();
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            match self.log.accept() {
                Ok((stream, _)) => {
                    stream.set_nonblocking(false).unwrap();
                    stream
                        .set_read_timeout(Some(Duration::from_secs(2)))
                        .unwrap();
                    return stream;
                }
                Err(_) if Instant::now() < deadline => thread::sleep(Duration::from_millis(10)),
                Err(e) => panic!("driver station never connected to the log port: {}", e),
            }
        }
    }
}

impl Drop for FakeRio {
    fn drop(&mut self) {
        self.streaming.store(false, Ordering::SeqCst);
    }
}

#[test]
fn control_packets_carry_state_and_joysticks() {
    let rio = FakeRio::new();
    let ds = DriverStation::with_config(Some("127.0.0.1"), Alliance::new_blue(2), 4069, rio.config());

    ds.joysticks().attach(1).unwrap();
    ds.joysticks().set_axis(1, 0, 1.0).unwrap();
    ds.joysticks().set_button(1, 2, true).unwrap();
    ds.set_mode(Mode::Teleoperated);
    ds.enable();

    let packet = (0..50)
        .map(|_| rio.next_control())
        .find(|packet| packet[3] & 0x04 != 0 && packet.len() > 6)
        .expect("no enabled packet with joysticks");

    assert_eq!(packet[2], 0x01);
    assert_eq!(packet[3] & 0b11, 0b00);
    assert_eq!(packet[5], Alliance::new_blue(2).bits());

    // port 0 is padded with an empty tag, port 1 has one axis, three buttons and no POVs
    assert_eq!(&packet[6..11], &[0x04, 0x0c, 0x00, 0x00, 0x00]);
    assert_eq!(&packet[11..], &[0x06, 0x0c, 0x01, 0x7f, 0x03, 0b0000_0100, 0x00]);

    assert!(ds.link_stats().packets_sent > 0);
}

#[test]
fn status_log_and_game_data() {
    let rio = FakeRio::new();
    let mut ds =
        DriverStation::with_config(Some("127.0.0.1"), Alliance::new_red(1), 4069, rio.config());

    let lines = Arc::new(Mutex::new(Vec::new()));
    let sink = lines.clone();
    ds.set_log_consumer(move |packet| {
        if let TcpPacket::Stdout(stdout) = packet {
            sink.lock().unwrap().push(stdout.message.clone());
        }
    });
    ds.set_game_specific_message("LLR").unwrap();

    rio.stream_status();
    assert!(eventually(Duration::from_secs(5), || ds.connected()));
    assert!((ds.battery_voltage() - 12.5).abs() < f32::EPSILON);
    assert!(ds.trace().is_code_started());
    assert!(ds.trace().is_connected_to_roborio());
    assert!(ds.link_stats().status_received > 0);

    let mut log = rio.accept_log();
    let mut gsm = [0u8; 6];
    log.read_exact(&mut gsm).unwrap();
    assert_eq!(&gsm, &[0x00, 0x04, 0x0e, b'L', b'L', b'R']);

    let message = b"Robot program starting";
    let mut frame = vec![];
    frame.extend(&((1 + 4 + 2 + message.len()) as u16).to_be_bytes());
    frame.push(0x0c);
    frame.extend(&1.25f32.to_be_bytes());
    frame.extend(&7u16.to_be_bytes());
    frame.extend(&message[..]);
    log.write_all(&frame).unwrap();

    assert!(eventually(Duration::from_secs(5), || !lines
        .lock()
        .unwrap()
        .is_empty()));
    assert_eq!(
        *lines.lock().unwrap(),
        vec!["Robot program starting".to_string()]
    );

    // a new message goes out on the open connection
    ds.set_game_specific_message("RRL").unwrap();
    log.read_exact(&mut gsm).unwrap();
    assert_eq!(&gsm, &[0x00, 0x04, 0x0e, b'R', b'R', b'L']);

    ds.enable();
    ds.shutdown();
    assert!(!ds.is_running());
    assert!(!ds.connected());
    assert!(!ds.enabled());
    assert_eq!(ds.battery_voltage(), 0.0);
    assert_eq!(ds.trace(), Trace::empty());

    ds.shutdown();
    assert!(!ds.is_running());
}

#[test]
fn silence_disconnects() {
    let rio = FakeRio::new();
    let config = rio.config().with_link_timeout(Duration::from_millis(200));
    let ds = DriverStation::with_config(Some("127.0.0.1"), Alliance::new_red(3), 4069, config);

    rio.stream_status();
    assert!(eventually(Duration::from_secs(5), || ds.connected()));

    rio.streaming.store(false, Ordering::SeqCst);
    assert!(eventually(Duration::from_secs(5), || !ds.connected()));
    assert_eq!(ds.battery_voltage(), 0.0);
}
