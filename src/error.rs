// Copyright 2019 Zhizhesihai (Beijing) Technology Limited.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// See the License for the specific language governing permissions and
// limitations under the License.

use std::borrow::Cow;
use std::sync::PoisonError;

error_chain! {
    types {
        Error, ErrorKind, ResultExt, Result;
    }
    errors {
        Poisoned {
            description("a thread holding the lock panicked and poisoned the lock")
        }

        /// Bad codec identifier, version out of the supported range, or
        /// metadata/data version mismatch. Surfaced at open, fatal.
        Format(desc: String) {
            description(desc)
            display("Format error: {}", desc)
        }

        /// Unknown type tag, unknown compression tag, oversized table
        /// dictionary, malformed field record or misplaced footer.
        CorruptFormat(desc: String) {
            description(desc)
            display("Corrupt format: {}", desc)
        }

        /// Checksum mismatch, reported by explicit full verification or by
        /// the metadata footer check at open.
        Integrity(desc: String) {
            description(desc)
            display("Integrity error: {}", desc)
        }

        IllegalState(desc: String) {
            description(desc)
            display("Illegal state: {}", desc)
        }

        IllegalArgument(desc: String) {
            description(desc)
            display("Illegal argument: {}", desc)
        }

        UnexpectedEOF(errmsg: String) {
            description(errmsg)
            display("Unexpected EOF: {}", errmsg)
        }

        UnsupportedOperation(errmsg: Cow<'static, str>) {
            description(errmsg)
            display("Unsupported Operation: {}", errmsg)
        }
    }

    foreign_links {
        IoError(::std::io::Error);
        FromUtf8Err(::std::string::FromUtf8Error);
        Utf8Error(::std::str::Utf8Error);
    }
}

impl<Guard> From<PoisonError<Guard>> for Error {
    fn from(_: PoisonError<Guard>) -> Error {
        ErrorKind::Poisoned.into()
    }
}
