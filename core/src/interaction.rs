/*
 * interaction.rs
 * Copyright (C) 2026 Chris Burdess
 *
 * This file is part of Gemlet, a Gemini protocol client.
 *
 * Gemlet is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Gemlet is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Gemlet.  If not, see <http://www.gnu.org/licenses/>.
 */

//! User-interaction boundary shared by the client (Input prompts) and the trust
//! manager (certificate decisions). One implementation per UI surface, passed around
//! as `Arc<dyn UserInteraction>`.

/// Questions and notices for the user. Calls block until the user answers.
pub trait UserInteraction: Send + Sync {
    /// Ask a question. `None` when no answer can be obtained (input closed).
    fn prompt(&self, message: &str) -> Option<String>;

    /// Ask for an answer that should not be echoed (e.g. a password).
    fn prompt_sensitive(&self, message: &str) -> Option<String> {
        self.prompt(message)
    }

    /// Show an informational or warning message.
    fn show_message(&self, message: &str);
}

/// What to do with one answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer<T> {
    /// Stop prompting with this value.
    Accept(T),
    /// Ask again (after whatever the callback already showed).
    Reprompt,
}

/// Prompt until `decide` accepts an answer. `None` when the prompt yields no answer.
pub fn prompt_until<T, F>(ui: &dyn UserInteraction, message: &str, sensitive: bool, mut decide: F) -> Option<T>
where
    F: FnMut(&str) -> Answer<T>,
{
    loop {
        let answer = if sensitive {
            ui.prompt_sensitive(message)?
        } else {
            ui.prompt(message)?
        };
        match decide(&answer) {
            Answer::Accept(value) => return Some(value),
            Answer::Reprompt => continue,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    struct Scripted {
        answers: Mutex<VecDeque<String>>,
        asked: Mutex<usize>,
    }

    impl UserInteraction for Scripted {
        fn prompt(&self, _message: &str) -> Option<String> {
            *self.asked.lock().unwrap() += 1;
            self.answers.lock().unwrap().pop_front()
        }

        fn show_message(&self, _message: &str) {}
    }

    fn scripted(answers: &[&str]) -> Scripted {
        Scripted {
            answers: Mutex::new(answers.iter().map(|s| s.to_string()).collect()),
            asked: Mutex::new(0),
        }
    }

    #[test]
    fn reprompts_until_accepted() {
        let ui = scripted(&["x", "y", "42"]);
        let n = prompt_until(&ui, "number?", false, |a| match a.parse::<u32>() {
            Ok(n) => Answer::Accept(n),
            Err(_) => Answer::Reprompt,
        });
        assert_eq!(n, Some(42));
        assert_eq!(*ui.asked.lock().unwrap(), 3);
    }

    #[test]
    fn closed_input_gives_none() {
        let ui = scripted(&["nope"]);
        let n: Option<u32> = prompt_until(&ui, "number?", true, |_| Answer::Reprompt);
        assert_eq!(n, None);
    }
}
