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

use ctf_sql::{install_mode_override, resolve_mode, settings, Error, Mode};
use matches::assert_matches;

#[test]
fn override_pins_mode_for_the_whole_process() {
    std::env::set_var("CTF_MODE", "0");
    std::env::set_var("CTF_SQL_SESSION_NAME", "web-level-3");

    install_mode_override("ctf").unwrap();
    assert_matches!(install_mode_override("0"), Err(Error::Config(_)));

    assert_eq!(resolve_mode(), Mode::Challenge);
    assert_eq!(settings().session_name, "web-level-3");
    assert_eq!(settings().credentials.user, "ctf_user");

    std::env::set_var("CTF_MODE", "production");
    std::env::set_var("CTF_SQL_SESSION_NAME", "changed");
    assert_eq!(resolve_mode(), Mode::Challenge);
    assert_eq!(settings().session_name, "web-level-3");

    let first: *const _ = settings();
    assert!(std::ptr::eq(first, settings()));
}
