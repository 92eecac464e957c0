use std::fs;

use nom::IResult;
use nom::character::complete::{i64 as signed_integer, multispace0, u64 as unsigned_integer};
use nom::sequence::preceded;

use crate::instance::Weight;

/// reads a whitespace-prefixed signed integer
fn read_weight(s:&str) -> IResult<&str, i64> {
    preceded(multispace0, signed_integer)(s)
}

/// reads a whitespace-prefixed unsigned integer
fn read_nb_vertices(s:&str) -> IResult<&str, u64> {
    preceded(multispace0, unsigned_integer)(s)
}

/** parses a CPn problem: the number of vertices, then the strict upper
triangle of the weight matrix in row-major order
(w[0][1] ... w[0][n-1], w[1][2], ...), separated by any mix of spaces and
newlines. Returns the symmetric weight matrix with a zero diagonal. */
pub fn read_from_str(content:&str) -> Vec<Vec<Weight>> {
    let (mut remaining, n) = read_nb_vertices(content)
        .expect("CPn: unable to read the number of vertices");
    let n = n as usize;
    let mut weights = vec![vec![0 ; n] ; n];
    for i in 0..n {
        for j in i+1..n {
            let (tmp, w) = read_weight(remaining)
                .expect("CPn: unable to read an edge weight");
            remaining = tmp;
            weights[i][j] = w;
            weights[j][i] = w; // make the matrix symmetric
        }
    }
    weights
}

/// reads a CPn instance file, returns the weight matrix
pub fn read_from_file(filename:&str) -> Vec<Vec<Weight>> {
    let content = fs::read_to_string(filename)
        .expect("CPn: unable to read the instance file");
    read_from_str(&content)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_single_vertex() {
        let weights = read_from_str("1\n");
        assert_eq!(weights, vec![vec![0]]);
    }

    #[test]
    fn test_read_pair() {
        let weights = read_from_str("2\n-3\n");
        assert_eq!(weights, vec![vec![0,-3], vec![-3,0]]);
    }

    #[test]
    fn test_read_mixed_whitespace() {
        let weights = read_from_str("3\n10 -1\n-1");
        assert_eq!(weights[0], vec![0,10,-1]);
        assert_eq!(weights[1], vec![10,0,-1]);
        assert_eq!(weights[2], vec![-1,-1,0]);
    }

    #[test]
    fn test_read_file() {
        let weights = read_from_file("insts/tiny/planted6.txt");
        assert_eq!(weights.len(), 6);
        assert_eq!(weights[0][1], 3);
        assert_eq!(weights[0][3], -10);
        assert_eq!(weights[4][5], 3);
        assert_eq!(weights[5][4], 3);
    }
}
