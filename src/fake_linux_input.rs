use std::{
    io::{self, Write},
    sync::{Mutex, PoisonError},
};

use termion::{clear, cursor, event::Key, input::TermRead, raw::IntoRawMode};

use crate::{basic::scaler::Scaler, manual_ctrl::AxisInput, msg_define::TickSample};

struct Channel {
    name: String,
    add_key: char,
    sub_key: char,
    center_key: char,
    value: i16,
}

impl Channel {
    const STEP: i16 = 100;

    fn new(name: &str, add_key: char, sub_key: char, center_key: char) -> Self {
        Self {
            name: name.to_string(),
            add_key,
            sub_key,
            center_key,
            value: 0,
        }
    }

    fn on_key(&mut self, key: char) {
        if key == self.add_key {
            self.value += Self::STEP;
        } else if key == self.sub_key {
            self.value -= Self::STEP;
        } else if key == self.center_key {
            self.value = 0;
        }
        self.value = self.value.clamp(-1000, 1000);
    }
}

/// Keyboard turn channel for interactive flight, until `q`.
pub fn run_keyboard(
    input: &AxisInput,
    telemetry: &Mutex<TickSample>,
    scaler: &Scaler,
) -> io::Result<()> {
    let mut turn = Channel::new("Turn", 'a', 'd', 's');

    let stdin = io::stdin();
    let mut stdout = io::stdout().into_raw_mode()?;

    write!(
        stdout,
        "{}{}a/d to turn, s to centre, q to exit.\r\n",
        clear::All,
        cursor::Goto(1, 1)
    )?;
    stdout.flush()?;

    for c in stdin.keys() {
        match c? {
            Key::Char('q') | Key::Ctrl('c') => break,
            Key::Char(k) => turn.on_key(k),
            _ => continue,
        }
        input.set_channel(turn.value, scaler);

        let t = *telemetry.lock().unwrap_or_else(PoisonError::into_inner);
        write!(stdout, "{}{}", cursor::Goto(1, 2), clear::AfterCursor)?;
        write!(
            stdout,
            "{}:{}\r\nangle:{:7.2} target:{:7.2} rate:{:6.3} torque:{:8.2}\r\n",
            turn.name, turn.value, t.angle, t.target_angle, t.angular_velocity, t.torque
        )?;
        stdout.flush()?;
    }
    write!(stdout, "finished!\r\n")?;
    stdout.flush()
}
