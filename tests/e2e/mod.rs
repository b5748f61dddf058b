// End-to-end tests for the narration pipeline
//
// Two levels:
// - Library level: the real chunker, pipeline and assembler driven by a fake
//   synthesizer that writes WAV tones, so durations are exact
// - Binary level (unix only): the compiled executable launching a shell
//   script in place of the XTTS backend, exercising config, the settings
//   file, subprocess invocation and exit codes
//
// Chunk files and outputs are WAV so no MP3 encoder is needed.

mod helpers;
mod test_config_store;
mod test_narration;
