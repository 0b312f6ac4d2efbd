/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */
//! The diagnostic binary. The real code is in lib.rs.

fn main() -> Result<(), String> {
    anbox_gles::main(std::env::args())
}
