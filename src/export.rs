use std::io::Write;

use crate::prelude::*;

/// Writes an explored tree as indented text, one line per result line: its move, score and the rest of its variation.
///
/// Children are found by playing each line's first move and looking the resulting position up by digest, so a
/// transposition is written out under every parent that reaches it.
pub fn write_tree(tree: &SessionTree, root: &Position, rules: &dyn Rules, depth: u32, out: &mut dyn Write) -> Result<()>
{
    writeln!(out, "{root}")?;
    write_lines(tree, root, rules, depth, 1, out)
}

fn write_lines(
    tree: &SessionTree,
    position: &Position,
    rules: &dyn Rules,
    depth: u32,
    indent: usize,
    out: &mut dyn Write,
) -> Result<()>
{
    let Some(lines) = tree.get(&position.digest())
    else
    {
        return Ok(());
    };

    for line in lines
    {
        let Some((first, rest)) = line.moves.split_first()
        else
        {
            continue;
        };

        write!(out, "{:width$}{} ({})", "", first, line.score, width = 2 * indent)?;
        for mv in rest
        {
            write!(out, " {mv}")?;
        }
        writeln!(out)?;

        if depth > 1
        {
            let child = rules.play(position, first)?;
            write_lines(tree, &child, rules, depth - 1, indent + 1, out)?;
        }
    }

    Ok(())
}
