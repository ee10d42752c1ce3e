use std::io::{self, Write};
use std::time::Duration;

use leadly_core::{update, AppState, AppViewModel, CoreSettings, Msg};

use super::effects::EffectRunner;
use super::ui::render::{render, Panel};

/// How long one loop iteration waits for an engine event.
const EVENT_WAIT: Duration = Duration::from_millis(100);

/// Owns the core state and feeds it one message at a time.
pub struct Session {
    state: AppState,
    runner: EffectRunner,
    last_frame: Vec<String>,
}

impl Session {
    pub fn new(settings: CoreSettings, runner: EffectRunner) -> Self {
        Self {
            state: AppState::with_settings(settings),
            runner,
            last_frame: Vec::new(),
        }
    }

    pub fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        self.runner.run(effects);
    }

    /// Applies form edits without rendering them.
    pub fn prefill(&mut self, msgs: impl IntoIterator<Item = Msg>) {
        for msg in msgs {
            self.dispatch(msg);
        }
        self.state.consume_dirty();
    }

    /// Processes engine events until no request is outstanding, rendering
    /// `panels` whenever the state changed.
    pub fn run_until_settled<W: Write>(
        &mut self,
        out: &mut W,
        panels: &[Panel],
    ) -> io::Result<AppViewModel> {
        self.render_if_dirty(out, panels)?;
        while self.state.is_busy() {
            if let Some(msg) = self.runner.next_msg(EVENT_WAIT) {
                self.dispatch(msg);
                self.render_if_dirty(out, panels)?;
            }
        }
        Ok(self.state.view())
    }

    fn render_if_dirty<W: Write>(&mut self, out: &mut W, panels: &[Panel]) -> io::Result<()> {
        if !self.state.consume_dirty() {
            return Ok(());
        }
        let frame = render(&self.state.view(), panels);
        if frame.is_empty() || frame == self.last_frame {
            return Ok(());
        }
        for line in &frame {
            writeln!(out, "{line}")?;
        }
        out.flush()?;
        self.last_frame = frame;
        Ok(())
    }
}
