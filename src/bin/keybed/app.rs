//! Application wiring: audio stream on one side, terminal session on the
//! other, two lock-free rings in between.

use std::io;

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossterm::event::{
    DisableMouseCapture, EnableMouseCapture, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::{execute, terminal};
use rtrb::RingBuffer;

use keybed::layout;
use keybed::synth::{EngineMessage, VoiceEngine};
use keybed::MAX_BLOCK_SIZE;

use super::config::Settings;
use super::ui::UiApp;

/// Control messages queued between the input and audio threads.
const CONTROL_QUEUE_SIZE: usize = 256;
/// Audio samples tapped for the oscilloscope strip.
const TAP_QUEUE_SIZE: usize = 8192;
/// Voice slots: every key of the largest layout plus room for tails.
const MAX_VOICES: usize = 64;

pub struct App {
    settings: Settings,
}

impl App {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Run the application (takes over the terminal, plays audio).
    pub fn run(self) -> EyreResult<()> {
        let keys = layout::layout(self.settings.start_note, self.settings.keys);

        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;
        let config = device
            .default_output_config()
            .wrap_err("failed to fetch default output config")?;

        let sample_rate = config.sample_rate().0 as f32;
        let channels = config.channels() as usize;

        let (msg_tx, mut msg_rx) = RingBuffer::<EngineMessage>::new(CONTROL_QUEUE_SIZE);
        let (mut tap_tx, tap_rx) = RingBuffer::<f32>::new(TAP_QUEUE_SIZE);

        // The engine lives inside the audio callback; the UI thread only
        // ever talks to it through the message ring.
        let mut engine = VoiceEngine::new(
            sample_rate,
            MAX_VOICES,
            self.settings.waveform.into(),
            self.settings.volume,
        );
        let mut render_buf = vec![0.0f32; MAX_BLOCK_SIZE];

        let stream = device.build_output_stream(
            &config.into(),
            move |data: &mut [f32], _| {
                engine.pump(&mut msg_rx);

                let total_frames = data.len() / channels;
                let mut frames_written = 0;

                while frames_written < total_frames {
                    let frames = (total_frames - frames_written).min(MAX_BLOCK_SIZE);
                    let block = &mut render_buf[..frames];
                    engine.render_block(block);

                    // Mono to all channels.
                    let out_off = frames_written * channels;
                    for (i, &s) in block.iter().enumerate() {
                        for ch in 0..channels {
                            data[out_off + i * channels + ch] = s;
                        }
                    }

                    // Tap for the oscilloscope; dropped samples are fine.
                    for &s in block.iter() {
                        let _ = tap_tx.push(s);
                    }

                    frames_written += frames;
                }
            },
            |err| eprintln!("audio error: {err}"),
            None,
        )?;
        stream.play()?;

        // Terminal session. Mouse capture gives us pointer events; the
        // keyboard enhancement protocol gives us key release events on
        // terminals that support it.
        let supports_release = terminal::supports_keyboard_enhancement().unwrap_or(false);
        let mut terminal = ratatui::init();
        execute!(io::stdout(), EnableMouseCapture)?;
        if supports_release {
            execute!(
                io::stdout(),
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
        }

        let result =
            UiApp::new(keys, &self.settings, msg_tx, tap_rx, supports_release).run(&mut terminal);

        if supports_release {
            let _ = execute!(io::stdout(), PopKeyboardEnhancementFlags);
        }
        let _ = execute!(io::stdout(), DisableMouseCapture);
        ratatui::restore();

        result
    }
}
