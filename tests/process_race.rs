// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.


// Process-wide state: this binary holds a single test so nothing else in the
// process resolves the settings first.

use std::sync::{Arc, Barrier};
use std::thread;

use ctf_sql::{install_mode_override, resolve_mode, settings, Error, Mode};
use matches::assert_matches;

#[test]
fn override_racing_first_access_is_never_lost() {
    std::env::set_var("CTF_MODE", "0");

    let barrier = Arc::new(Barrier::new(9));
    let readers: Vec<_> = (0..8)
        .map(|_| {
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                settings().mode
            })
        })
        .collect();

    barrier.wait();
    let installed = install_mode_override("ctf");
    let seen: Vec<Mode> = readers.into_iter().map(|r| r.join().unwrap()).collect();

    // Whoever got there first decided, and everyone agrees on it.
    let mode = resolve_mode();
    assert!(seen.iter().all(|m| *m == mode), "{:?} vs {:?}", seen, mode);
    match installed {
        Ok(()) => assert_eq!(mode, Mode::Challenge),
        Err(err) => {
            assert_matches!(err, Error::Config(_));
            assert_eq!(mode, Mode::Normal);
        }
    }
}
