use clap::Parser;

/// Arguments for completions command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Generate bash completions:\n    pinledger completions bash > ~/.bash_completion.d/pinledger\n\n\
                  Generate zsh completions:\n    pinledger completions zsh > ~/.zfunc/_pinledger\n\n\
                  Generate fish completions:\n    pinledger completions fish > ~/.config/fish/completions/pinledger.fish\n\n\
                  Generate PowerShell completions:\n    pinledger completions powershell")]
pub struct CompletionsArgs {
    /// Shell type
    #[arg(value_enum, ignore_case = true)]
    pub shell: clap_complete::Shell,
}
